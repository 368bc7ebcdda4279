//! The decode-adapt engine: tracks the declared input format, owns the
//! codec backend / resample adapter pair, and drains encoded chunks into
//! caller-provided output frames.

mod backend;
mod opus;
mod symphonia;

pub use backend::{BackendFactory, CodecBackend, DecodeStep, DecodedUnit, create_backend};
pub use opus::OpusBackend;
pub use symphonia::SymphoniaBackend;

use crate::command::StageCommand;
use crate::config::StageConfig;
use crate::error::StageError;
use crate::format::{EncodedChunk, InputFormat, OutputFormat};
use crate::frame::AudioFrame;
use crate::resample::ResampleAdapter;
use std::sync::Arc;

/// The live adapter pair. Always consistent with the stage's current input
/// and output descriptors; torn down and rebuilt together.
struct DecoderState {
    backend: Box<dyn CodecBackend>,
    resampler: ResampleAdapter,
}

/// Streaming decode-and-adapt stage.
///
/// Feed it encoded chunks with [`process_chunk`](Self::process_chunk) and it
/// fills output frames normalized to the configured output format,
/// rebuilding its decoder and resample contexts whenever the declared input
/// format changes. The output format is reconfigured live with
/// [`apply_command`](Self::apply_command) or
/// [`configure_output`](Self::configure_output).
///
/// The stage is driven by a single worker: `process_chunk` and
/// `apply_command` both mutate the adapter pair and must not be called
/// concurrently from different threads without external serialization (see
/// [`StageWorker`](crate::StageWorker) for the intended wiring).
pub struct DecodeStage {
    output: OutputFormat,
    input: Option<InputFormat>,
    state: Option<DecoderState>,
    factory: BackendFactory,
    rebuilds: u64,
}

impl DecodeStage {
    /// Create a stage with the built-in codec backends.
    pub fn new(config: &StageConfig) -> Self {
        Self::with_backend_factory(config, Arc::new(create_backend))
    }

    /// Create a stage with a custom backend factory, for embedders that
    /// bring their own codec registry.
    pub fn with_backend_factory(config: &StageConfig, factory: BackendFactory) -> Self {
        Self {
            output: config.output_format(),
            input: None,
            state: None,
            factory,
            rebuilds: 0,
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output
    }

    /// Number of full adapter-pair rebuilds performed so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Replace the output format descriptor.
    ///
    /// When a decoder pair is live, the resample context is rebuilt
    /// immediately against the latest input and output descriptors; a
    /// rebuild failure tears the pair down and the stage stays not ready
    /// until the next successful reconfiguration.
    pub fn configure_output(&mut self, format: OutputFormat) -> Result<(), StageError> {
        if format.channels == 0 || format.sample_rate == 0 {
            return Err(StageError::InvalidConfig(format!("output {format}")));
        }

        self.output = format;
        log::info!("Output format set to {}", self.output);

        if let (Some(input), Some(state)) = (self.input, self.state.as_mut()) {
            match ResampleAdapter::new(&input, &self.output) {
                Ok(resampler) => state.resampler = resampler,
                Err(e) => {
                    self.state = None;
                    log::error!("Resample context rebuild failed: {e}");
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Apply a control command. Absent `configure` fields keep their
    /// current values; an empty `configure` is an idempotent no-op that
    /// still goes through the output-format setter.
    pub fn apply_command(&mut self, command: &StageCommand) -> Result<(), StageError> {
        match command {
            StageCommand::Configure(params) => {
                let mut next = self.output;
                if let Some(sample_rate) = params.sample_rate {
                    next.sample_rate = sample_rate;
                }
                if let Some(channels) = params.channels {
                    next.channels = channels;
                }
                if let Some(sample_format) = params.sample_format {
                    next.sample_format = sample_format;
                }
                self.configure_output(next)
            }
        }
    }

    /// Decode one encoded chunk into `frame`.
    ///
    /// Returns `Ok(true)` when a frame was produced, `Ok(false)` when the
    /// chunk decoded to nothing (headers, silence markers), and `Err` when
    /// the chunk was dropped. Only the first successfully converted unit
    /// per chunk is emitted; remaining undecoded bytes are discarded. That
    /// one-frame-per-call contract matches the surrounding pipeline's pull
    /// model and is kept for compatibility.
    pub fn process_chunk(
        &mut self,
        chunk: &EncodedChunk,
        frame: &mut AudioFrame,
    ) -> Result<bool, StageError> {
        self.track_input(chunk.input_format())?;
        let state = self.state.as_mut().ok_or(StageError::NotReady)?;

        let mut cursor: &[u8] = &chunk.payload;
        while !cursor.is_empty() {
            let step = state.backend.decode(cursor)?;

            if let Some(unit) = &step.unit {
                match state.resampler.convert(unit, frame) {
                    Ok(_) => return Ok(true),
                    Err(e) => log::warn!("Dropping decoded unit: {e}"),
                }
            }

            // Zero progress without an emitted frame would loop forever.
            if step.consumed == 0 {
                return Err(StageError::DecodeStall(cursor.len()));
            }
            cursor = &cursor[step.consumed.min(cursor.len())..];
        }

        Ok(false)
    }

    /// Compare the chunk's declared format with the stored one and rebuild
    /// the adapter pair on any change. The identical-format case is the hot
    /// path and does no work.
    fn track_input(&mut self, format: InputFormat) -> Result<(), StageError> {
        if self.input == Some(format) {
            return match self.state {
                Some(_) => Ok(()),
                None => Err(StageError::NotReady),
            };
        }

        log::info!("Input format change to {format}, rebuilding decoder");
        self.input = Some(format);
        // Old pair is dropped in full before any rebuild starts.
        self.state = None;

        let backend = (self.factory)(&format)?;
        let resampler = ResampleAdapter::new(&format, &self.output)?;
        self.state = Some(DecoderState { backend, resampler });
        self.rebuilds += 1;
        Ok(())
    }
}
