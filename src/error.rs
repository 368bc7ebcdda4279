//! Error taxonomy for the decode-adapt stage.

use thiserror::Error;

/// Errors surfaced by the decode stage and its adapters.
///
/// None of these are fatal to the stage itself: configuration errors put the
/// stage into a not-ready state until the next successful reconfiguration,
/// decode and conversion errors drop the current chunk or unit and leave the
/// stage usable for the next one. Escalation is the caller's decision.
#[derive(Debug, Error)]
pub enum StageError {
    /// The declared input format cannot be handled by any backend.
    #[error("unsupported input format: {0}")]
    UnsupportedInput(String),

    /// Codec backend creation failed.
    #[error("decoder init failed: {0}")]
    BackendInit(String),

    /// Resample context creation failed.
    #[error("resampler init failed: {0}")]
    ResamplerInit(String),

    /// An output format descriptor with invalid fields was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A previous reconfiguration failed; decode calls fail fast until a
    /// successful reconfiguration replaces the adapters.
    #[error("stage not ready: previous reconfiguration failed")]
    NotReady,

    /// The codec backend rejected the chunk.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The backend consumed no bytes and produced no output.
    #[error("decoder made no progress with {0} bytes remaining")]
    DecodeStall(usize),

    /// Sample conversion of a decoded unit failed.
    #[error("sample conversion failed: {0}")]
    Convert(String),
}

impl StageError {
    /// True for errors raised at reconfiguration time, which leave the stage
    /// not ready until the next successful rebuild.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StageError::UnsupportedInput(_)
                | StageError::BackendInit(_)
                | StageError::ResamplerInit(_)
                | StageError::InvalidConfig(_)
                | StageError::NotReady
        )
    }
}
