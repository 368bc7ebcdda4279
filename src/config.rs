//! Stage configuration and the documented output-format defaults.

use crate::format::{OutputFormat, SampleFormat};

/// Output format used before any reconfiguration event arrives.
pub const DEFAULT_SAMPLE_FORMAT: SampleFormat = SampleFormat::S16Planar;
pub const DEFAULT_CHANNELS: u32 = 2;
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// Decode stage configuration.
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// Sample representation of emitted frames.
    pub sample_format: SampleFormat,
    /// Channel count of emitted frames.
    pub channels: u32,
    /// Sample rate of emitted frames in Hz.
    pub sample_rate: u32,
}

impl StageConfig {
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat {
            sample_format: self.sample_format,
            channels: self.channels,
            sample_rate: self.sample_rate,
        }
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            sample_format: DEFAULT_SAMPLE_FORMAT,
            channels: DEFAULT_CHANNELS,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}
