//! audio-adapt — streaming audio decode-and-adapt stage.
//!
//! Accepts successive chunks of encoded audio (Opus, MP3, mu-law PCM),
//! follows silent changes in their declared input format, and emits decoded
//! frames normalized to one externally configured output format. Uses the
//! libopus and Symphonia decoders for the codec work and rubato for sample
//! rate conversion.

mod command;
mod config;
pub mod decode;
mod error;
mod format;
mod frame;
mod resample;
mod worker;

pub use command::{ConfigureParams, StageCommand};
pub use config::{DEFAULT_CHANNELS, DEFAULT_SAMPLE_FORMAT, DEFAULT_SAMPLE_RATE, StageConfig};
pub use decode::{BackendFactory, CodecBackend, DecodeStage, DecodeStep, DecodedUnit};
pub use error::StageError;
pub use format::{AudioCodec, EncodedChunk, InputFormat, OutputFormat, SampleFormat};
pub use frame::AudioFrame;
pub use resample::ResampleAdapter;
pub use worker::StageWorker;
