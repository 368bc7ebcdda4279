//! Audio format descriptors shared between the decode stage and its callers.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Codec identity of an encoded audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCodec {
    /// G.711 mu-law PCM (8-bit companded).
    #[serde(rename = "pcmu")]
    PcmMulaw,
    #[serde(rename = "opus")]
    Opus,
    #[serde(rename = "mp3")]
    Mp3,
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AudioCodec::PcmMulaw => "pcmu",
            AudioCodec::Opus => "opus",
            AudioCodec::Mp3 => "mp3",
        };
        f.write_str(name)
    }
}

/// Sample representation and memory layout of raw PCM audio.
///
/// Planar variants keep each channel in its own buffer; interleaved
/// variants pack all channels into a single buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    #[serde(rename = "u8")]
    U8,
    #[serde(rename = "s16")]
    S16,
    #[serde(rename = "f32")]
    F32,
    #[serde(rename = "u8p")]
    U8Planar,
    #[serde(rename = "s16p")]
    S16Planar,
    #[serde(rename = "f32p")]
    F32Planar,
}

impl SampleFormat {
    /// Bytes occupied by one sample of one channel.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::U8 | SampleFormat::U8Planar => 1,
            SampleFormat::S16 | SampleFormat::S16Planar => 2,
            SampleFormat::F32 | SampleFormat::F32Planar => 4,
        }
    }

    pub fn is_planar(&self) -> bool {
        matches!(
            self,
            SampleFormat::U8Planar | SampleFormat::S16Planar | SampleFormat::F32Planar
        )
    }

    /// Parse a wire-format name ("u8", "s16", "f32", "u8p", "s16p", "f32p").
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "u8" => Some(SampleFormat::U8),
            "s16" => Some(SampleFormat::S16),
            "f32" => Some(SampleFormat::F32),
            "u8p" => Some(SampleFormat::U8Planar),
            "s16p" => Some(SampleFormat::S16Planar),
            "f32p" => Some(SampleFormat::F32Planar),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleFormat::U8 => "u8",
            SampleFormat::S16 => "s16",
            SampleFormat::F32 => "f32",
            SampleFormat::U8Planar => "u8p",
            SampleFormat::S16Planar => "s16p",
            SampleFormat::F32Planar => "f32p",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared format of incoming encoded audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFormat {
    pub codec: AudioCodec,
    pub sample_format: SampleFormat,
    pub channels: u32,
    pub sample_rate: u32,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}ch/{}Hz",
            self.codec, self.sample_format, self.channels, self.sample_rate
        )
    }
}

/// Target format for decoded audio frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    pub sample_format: SampleFormat,
    pub channels: u32,
    pub sample_rate: u32,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}ch/{}Hz",
            self.sample_format, self.channels, self.sample_rate
        )
    }
}

/// One buffer of encoded audio handed in by the transport, tagged with the
/// format the sender declared for it. The declared format may change from
/// chunk to chunk.
#[derive(Debug, Clone)]
pub struct EncodedChunk {
    pub codec: AudioCodec,
    pub sample_format: SampleFormat,
    pub channels: u32,
    pub sample_rate: u32,
    pub payload: Bytes,
}

impl EncodedChunk {
    pub fn input_format(&self) -> InputFormat {
        InputFormat {
            codec: self.codec,
            sample_format: self.sample_format,
            channels: self.channels,
            sample_rate: self.sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_per_sample_matches_representation() {
        assert_eq!(SampleFormat::U8.bytes_per_sample(), 1);
        assert_eq!(SampleFormat::S16Planar.bytes_per_sample(), 2);
        assert_eq!(SampleFormat::F32.bytes_per_sample(), 4);
        assert_eq!(SampleFormat::F32Planar.bytes_per_sample(), 4);
    }

    #[test]
    fn planar_flag() {
        assert!(!SampleFormat::S16.is_planar());
        assert!(SampleFormat::S16Planar.is_planar());
        assert!(SampleFormat::U8Planar.is_planar());
    }

    #[test]
    fn name_roundtrip() {
        for format in [
            SampleFormat::U8,
            SampleFormat::S16,
            SampleFormat::F32,
            SampleFormat::U8Planar,
            SampleFormat::S16Planar,
            SampleFormat::F32Planar,
        ] {
            assert_eq!(SampleFormat::from_name(format.name()), Some(format));
        }
        assert_eq!(SampleFormat::from_name("dbl"), None);
    }

    #[test]
    fn chunk_exposes_declared_format() {
        let chunk = EncodedChunk {
            codec: AudioCodec::Opus,
            sample_format: SampleFormat::S16,
            channels: 1,
            sample_rate: 24000,
            payload: Bytes::from_static(&[0u8; 4]),
        };
        let format = chunk.input_format();
        assert_eq!(format.codec, AudioCodec::Opus);
        assert_eq!(format.channels, 1);
        assert_eq!(format.sample_rate, 24000);
    }
}
