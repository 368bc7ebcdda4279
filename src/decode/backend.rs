//! Codec backend abstraction and the built-in backend factory.

use crate::error::StageError;
use crate::format::{AudioCodec, InputFormat};
use std::sync::Arc;

use super::opus::OpusBackend;
use super::symphonia::SymphoniaBackend;

/// One decoded unit of audio at the input's native channel count and rate,
/// as normalized planar f32. Produced by a backend decode step and consumed
/// immediately by the resample adapter.
#[derive(Debug, Clone)]
pub struct DecodedUnit {
    /// One plane per input channel, all of length `frames`.
    pub planes: Vec<Vec<f32>>,
    /// Samples per channel.
    pub frames: usize,
}

impl DecodedUnit {
    pub fn channels(&self) -> usize {
        self.planes.len()
    }
}

/// Result of one backend decode step.
pub struct DecodeStep {
    /// Encoded bytes consumed from the front of the input.
    pub consumed: usize,
    /// Decoded unit, when the consumed bytes completed one.
    pub unit: Option<DecodedUnit>,
}

/// A codec decode engine keyed to one (codec, input format) combination.
///
/// Implementations own all decoder state; the stage feeds them the
/// remaining bytes of the current chunk and advances by the consumed count.
pub trait CodecBackend: Send {
    /// Decode from the front of `input`. An error means the chunk cannot be
    /// decoded and will be dropped by the caller; the backend itself must
    /// remain usable for the next chunk.
    fn decode(&mut self, input: &[u8]) -> Result<DecodeStep, StageError>;
}

/// Selects and builds a codec backend for a declared input format.
///
/// The stage takes one of these at construction, so embedders can swap in
/// their own registry; [`create_backend`] is the built-in one.
pub type BackendFactory =
    Arc<dyn Fn(&InputFormat) -> Result<Box<dyn CodecBackend>, StageError> + Send + Sync>;

/// Built-in factory covering the supported codecs.
pub fn create_backend(format: &InputFormat) -> Result<Box<dyn CodecBackend>, StageError> {
    match format.codec {
        AudioCodec::Opus => Ok(Box::new(OpusBackend::new(format)?)),
        AudioCodec::PcmMulaw | AudioCodec::Mp3 => Ok(Box::new(SymphoniaBackend::new(format)?)),
    }
}
