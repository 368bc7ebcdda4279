//! Symphonia-backed codec backend for MP3 and mu-law PCM.

use crate::error::StageError;
use crate::format::{AudioCodec, InputFormat};
use crate::frame::AudioFrame;

use super::backend::{CodecBackend, DecodeStep, DecodedUnit};

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Channels, Signal};
use symphonia::core::codecs::{
    CODEC_TYPE_MP3, CODEC_TYPE_PCM_MULAW, CodecParameters, Decoder, DecoderOptions,
};
use symphonia::core::conv::FromSample;
use symphonia::core::formats::Packet;
use symphonia::core::sample::Sample;

/// Wraps a Symphonia codec decoder fed with raw packets.
///
/// There is no container here: each chunk is handed to the decoder as one
/// packet built from the declared input format, which is how an elementary
/// stream off a transport arrives.
pub struct SymphoniaBackend {
    decoder: Box<dyn Decoder>,
    codec: AudioCodec,
}

impl SymphoniaBackend {
    pub fn new(format: &InputFormat) -> Result<Self, StageError> {
        let codec_type = match format.codec {
            AudioCodec::PcmMulaw => CODEC_TYPE_PCM_MULAW,
            AudioCodec::Mp3 => CODEC_TYPE_MP3,
            AudioCodec::Opus => {
                return Err(StageError::UnsupportedInput(
                    "opus is handled by the opus backend".into(),
                ));
            }
        };

        let mut params = CodecParameters::new();
        params
            .for_codec(codec_type)
            .with_sample_rate(format.sample_rate)
            .with_channels(channel_mask(format.channels)?)
            .with_max_frames_per_packet(AudioFrame::max_samples(format.sample_rate).max(4096) as u64);
        if format.codec == AudioCodec::PcmMulaw {
            params.with_bits_per_coded_sample(8);
        }

        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| StageError::BackendInit(format!("{}: {e}", format.codec)))?;

        Ok(Self {
            decoder,
            codec: format.codec,
        })
    }
}

impl CodecBackend for SymphoniaBackend {
    fn decode(&mut self, input: &[u8]) -> Result<DecodeStep, StageError> {
        let packet = Packet::new_from_slice(0, 0, 0, input);
        let decoded = self
            .decoder
            .decode(&packet)
            .map_err(|e| StageError::Decode(format!("{}: {e}", self.codec)))?;

        let unit = unit_from_buffer(&decoded);
        Ok(DecodeStep {
            consumed: input.len(),
            unit: (unit.frames > 0).then_some(unit),
        })
    }
}

fn channel_mask(count: u32) -> Result<Channels, StageError> {
    if count == 0 || count > 16 {
        return Err(StageError::UnsupportedInput(format!(
            "unsupported channel count {count}"
        )));
    }
    Channels::from_bits((1u32 << count) - 1).ok_or_else(|| {
        StageError::UnsupportedInput(format!("no channel layout for {count} channels"))
    })
}

fn unit_from_buffer(buffer: &AudioBufferRef<'_>) -> DecodedUnit {
    match buffer {
        AudioBufferRef::U8(buf) => copy_planes(&**buf),
        AudioBufferRef::U16(buf) => copy_planes(&**buf),
        AudioBufferRef::U24(buf) => copy_planes(&**buf),
        AudioBufferRef::U32(buf) => copy_planes(&**buf),
        AudioBufferRef::S8(buf) => copy_planes(&**buf),
        AudioBufferRef::S16(buf) => copy_planes(&**buf),
        AudioBufferRef::S24(buf) => copy_planes(&**buf),
        AudioBufferRef::S32(buf) => copy_planes(&**buf),
        AudioBufferRef::F32(buf) => copy_planes(&**buf),
        AudioBufferRef::F64(buf) => copy_planes(&**buf),
    }
}

/// Copy a decoded buffer into owned planar f32, one plane per channel.
fn copy_planes<S>(buf: &AudioBuffer<S>) -> DecodedUnit
where
    S: Sample,
    f32: FromSample<S>,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    let planes = (0..channels)
        .map(|ch| {
            buf.chan(ch)[..frames]
                .iter()
                .map(|&s| f32::from_sample(s))
                .collect()
        })
        .collect();
    DecodedUnit { planes, frames }
}
