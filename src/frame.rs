//! Caller-allocated output frames for decoded audio.

use crate::format::{OutputFormat, SampleFormat};

/// Longest frame the stage will emit, in milliseconds. Matches the maximum
/// Opus frame duration (120 ms at 48 kHz = 5760 samples per channel).
const MAX_FRAME_MS: usize = 120;

#[derive(Debug, Clone)]
enum FrameData {
    Interleaved(Vec<u8>),
    Planar(Vec<Vec<u8>>),
}

/// One decoded audio frame.
///
/// The frame is allocated by the caller (the queue collaborator upstream)
/// with a fixed capacity in samples per channel; the decode stage fills it
/// in place and sets the produced sample count and byte length. For planar
/// formats `byte_len` is the filled length of each channel plane; for
/// interleaved formats it is the filled length of the single buffer.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    sample_format: SampleFormat,
    channels: u32,
    sample_rate: u32,
    max_samples: usize,
    samples: usize,
    byte_len: usize,
    data: FrameData,
}

impl AudioFrame {
    /// Allocate a frame for `max_samples` samples per channel in the given
    /// output format.
    pub fn with_capacity(format: &OutputFormat, max_samples: usize) -> Self {
        let bps = format.sample_format.bytes_per_sample();
        let data = if format.sample_format.is_planar() {
            FrameData::Planar(vec![vec![0u8; max_samples * bps]; format.channels as usize])
        } else {
            FrameData::Interleaved(vec![0u8; max_samples * format.channels as usize * bps])
        };
        Self {
            sample_format: format.sample_format,
            channels: format.channels,
            sample_rate: format.sample_rate,
            max_samples,
            samples: 0,
            byte_len: 0,
            data,
        }
    }

    /// Capacity in samples per channel for frames at `sample_rate`.
    pub fn max_samples(sample_rate: u32) -> usize {
        sample_rate as usize * MAX_FRAME_MS / 1000
    }

    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn capacity(&self) -> usize {
        self.max_samples
    }

    /// Samples per channel currently filled.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Filled byte length: per plane for planar frames, total for
    /// interleaved frames.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn is_planar(&self) -> bool {
        self.sample_format.is_planar()
    }

    /// Filled bytes of the single interleaved buffer. Empty for planar
    /// frames.
    pub fn data(&self) -> &[u8] {
        match &self.data {
            FrameData::Interleaved(buf) => &buf[..self.byte_len],
            FrameData::Planar(_) => &[],
        }
    }

    /// Filled bytes of one channel plane. Empty for interleaved frames or
    /// out-of-range channels.
    pub fn plane(&self, channel: usize) -> &[u8] {
        match &self.data {
            FrameData::Planar(planes) => planes
                .get(channel)
                .map(|p| &p[..self.byte_len])
                .unwrap_or(&[]),
            FrameData::Interleaved(_) => &[],
        }
    }

    pub(crate) fn buffer_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.data {
            FrameData::Interleaved(buf) => Some(buf.as_mut_slice()),
            FrameData::Planar(_) => None,
        }
    }

    pub(crate) fn plane_mut(&mut self, channel: usize) -> Option<&mut [u8]> {
        match &mut self.data {
            FrameData::Planar(planes) => planes.get_mut(channel).map(|p| p.as_mut_slice()),
            FrameData::Interleaved(_) => None,
        }
    }

    pub(crate) fn set_filled(&mut self, samples: usize, byte_len: usize) {
        self.samples = samples;
        self.byte_len = byte_len;
    }
}
