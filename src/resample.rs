//! Resample adapter: rate, channel, and representation conversion of decoded
//! units into caller-provided output frames.
//!
//! Rate conversion is delegated to rubato; channel mapping and sample
//! representation are applied on the planar f32 data afterwards.

use crate::error::StageError;
use crate::format::{InputFormat, OutputFormat, SampleFormat};
use crate::frame::AudioFrame;

use crate::decode::DecodedUnit;
use rubato::{FftFixedIn, Resampler};
use symphonia::core::conv::FromSample;

// rubato works on fixed-size chunks; 1024 frames with 2 sub-chunks is a
// reasonable latency/efficiency trade-off for speech and music rates.
const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Conversion context keyed to one (input format, output format) pair.
///
/// Rebuilt by the decode stage whenever either descriptor changes.
pub struct ResampleAdapter {
    resampler: Option<FftFixedIn<f32>>,
    in_channels: usize,
    out_format: OutputFormat,
}

impl ResampleAdapter {
    /// Build a conversion context from the input format to the output
    /// format. The rate converter runs at the input channel count; channel
    /// mapping happens after it, the way the decode path has always ordered
    /// these steps.
    pub fn new(input: &InputFormat, output: &OutputFormat) -> Result<Self, StageError> {
        if input.channels == 0 || input.sample_rate == 0 {
            return Err(StageError::InvalidConfig(format!("input {input}")));
        }
        if output.channels == 0 || output.sample_rate == 0 {
            return Err(StageError::InvalidConfig(format!("output {output}")));
        }

        let resampler = if input.sample_rate != output.sample_rate {
            let fft = FftFixedIn::<f32>::new(
                input.sample_rate as usize,
                output.sample_rate as usize,
                CHUNK_FRAMES,
                SUB_CHUNKS,
                input.channels as usize,
            )
            .map_err(|e| {
                StageError::ResamplerInit(format!(
                    "{} -> {} Hz, {} ch: {e}",
                    input.sample_rate, output.sample_rate, input.channels
                ))
            })?;
            Some(fft)
        } else {
            None
        };

        Ok(Self {
            resampler,
            in_channels: input.channels as usize,
            out_format: *output,
        })
    }

    /// Convert one decoded unit into `frame`, returning the number of
    /// samples per channel produced. Output exceeding the frame's capacity
    /// is truncated.
    pub fn convert(
        &mut self,
        unit: &DecodedUnit,
        frame: &mut AudioFrame,
    ) -> Result<usize, StageError> {
        if unit.channels() != self.in_channels {
            return Err(StageError::Convert(format!(
                "unit has {} channels, adapter expects {}",
                unit.channels(),
                self.in_channels
            )));
        }
        if frame.channels() != self.out_format.channels
            || frame.sample_format() != self.out_format.sample_format
        {
            return Err(StageError::Convert(format!(
                "frame format {}/{}ch does not match configured output {}",
                frame.sample_format(),
                frame.channels(),
                self.out_format
            )));
        }

        // 1. Rate conversion (identity when rates match).
        let rated_storage;
        let rated: &[Vec<f32>] = match self.resampler.as_mut() {
            Some(resampler) => {
                rated_storage = rate_convert(resampler, unit)?;
                &rated_storage
            }
            None => &unit.planes,
        };

        // 2. Channel mapping.
        let out_channels = self.out_format.channels as usize;
        let mapped_storage;
        let mapped: &[Vec<f32>] = if out_channels == rated.len() {
            rated
        } else {
            mapped_storage = map_channels(rated, out_channels);
            &mapped_storage
        };

        // 3. Representation and layout.
        write_frame(mapped, frame)
    }

}

/// Push the unit through rubato in fixed-size chunks, using a partial call
/// for the tail. The FFT engine's padding and latency semantics are
/// accepted as-is.
fn rate_convert(
    resampler: &mut FftFixedIn<f32>,
    unit: &DecodedUnit,
) -> Result<Vec<Vec<f32>>, StageError> {
    let mut out: Vec<Vec<f32>> = vec![Vec::new(); unit.channels()];
    let mut pos = 0;
    while pos < unit.frames {
        let need = resampler.input_frames_next();
        let take = need.min(unit.frames - pos);
        let chunk: Vec<&[f32]> = unit.planes.iter().map(|p| &p[pos..pos + take]).collect();
        let produced = if take == need {
            resampler.process(&chunk, None)
        } else {
            resampler.process_partial(Some(&chunk), None)
        }
        .map_err(|e| StageError::Convert(format!("resampler: {e}")))?;
        for (ch, mut plane) in produced.into_iter().enumerate() {
            out[ch].append(&mut plane);
        }
        pos += take;
    }
    Ok(out)
}

/// Map planar f32 audio between channel counts: passthrough when equal,
/// averaging down-mix to mono, index-wrapping map otherwise.
fn map_channels(planes: &[Vec<f32>], out_channels: usize) -> Vec<Vec<f32>> {
    let in_channels = planes.len();
    let frames = planes.first().map(|p| p.len()).unwrap_or(0);

    if out_channels == 1 && in_channels > 1 {
        let mut mono = vec![0f32; frames];
        for (i, sample) in mono.iter_mut().enumerate() {
            let mut sum = 0f32;
            for plane in planes {
                sum += plane[i];
            }
            *sample = sum / in_channels as f32;
        }
        return vec![mono];
    }

    (0..out_channels)
        .map(|ch| planes[ch % in_channels].clone())
        .collect()
}

/// Write planar f32 audio into the frame in its configured representation
/// and layout, truncating at the frame's capacity. Returns the samples per
/// channel written.
fn write_frame(planes: &[Vec<f32>], frame: &mut AudioFrame) -> Result<usize, StageError> {
    let channels = planes.len();
    let samples = planes
        .first()
        .map(|p| p.len())
        .unwrap_or(0)
        .min(frame.capacity());
    let format = frame.sample_format();
    let bps = format.bytes_per_sample();

    if format.is_planar() {
        for (ch, plane) in planes.iter().enumerate() {
            let dst = frame.plane_mut(ch).ok_or_else(|| {
                StageError::Convert(format!("frame is missing plane {ch} of {channels}"))
            })?;
            for (i, &sample) in plane[..samples].iter().enumerate() {
                write_sample(format, sample, &mut dst[i * bps..(i + 1) * bps]);
            }
        }
        frame.set_filled(samples, samples * bps);
    } else {
        let dst = frame
            .buffer_mut()
            .ok_or_else(|| StageError::Convert("frame has no interleaved buffer".into()))?;
        for (ch, plane) in planes.iter().enumerate() {
            for (i, &sample) in plane[..samples].iter().enumerate() {
                let at = (i * channels + ch) * bps;
                write_sample(format, sample, &mut dst[at..at + bps]);
            }
        }
        frame.set_filled(samples, samples * channels * bps);
    }

    Ok(samples)
}

fn write_sample(format: SampleFormat, sample: f32, dst: &mut [u8]) {
    match format {
        SampleFormat::U8 | SampleFormat::U8Planar => {
            dst[0] = u8::from_sample(sample);
        }
        SampleFormat::S16 | SampleFormat::S16Planar => {
            dst.copy_from_slice(&i16::from_sample(sample).to_ne_bytes());
        }
        SampleFormat::F32 | SampleFormat::F32Planar => {
            dst.copy_from_slice(&sample.to_ne_bytes());
        }
    }
}
