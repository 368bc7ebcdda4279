//! Dedicated worker thread driving a decode stage.
//!
//! Uses std::thread (NOT tokio tasks) for the data path to avoid contention
//! with async network tasks; the channel endpoints are tokio mpsc so the
//! async side can feed chunks and commands without blocking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;

use anyhow::Result;

use crate::command::StageCommand;
use crate::config::StageConfig;
use crate::decode::DecodeStage;
use crate::format::EncodedChunk;
use crate::frame::AudioFrame;

/// Owns the decode worker thread.
///
/// The worker serializes data-path and control-path calls by construction:
/// pending commands are drained between chunks, so `process_chunk` and
/// `apply_command` never race.
pub struct StageWorker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl StageWorker {
    /// Start the worker.
    ///
    /// * `config`   - Stage configuration (initial output format)
    /// * `chunk_rx` - Receiver for encoded chunks from the transport
    /// * `command_rx` - Receiver for control commands, drained between chunks
    /// * `frame_tx` - Sender for produced output frames
    pub fn start(
        config: StageConfig,
        chunk_rx: mpsc::Receiver<EncodedChunk>,
        command_rx: mpsc::Receiver<StageCommand>,
        frame_tx: mpsc::Sender<AudioFrame>,
    ) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));

        let handle = {
            let running = running.clone();
            thread::Builder::new()
                .name("decode-adapt".into())
                .spawn(move || {
                    if let Err(e) = stage_thread(&config, chunk_rx, command_rx, frame_tx, &running)
                    {
                        log::error!("Decode stage thread error: {}", e);
                    }
                })?
        };

        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Signal the worker to stop.
    ///
    /// The thread exits once the chunk sender is dropped or the next chunk
    /// arrives; we detach it here to avoid blocking on a quiet stream.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.handle.take();
    }
}

impl Drop for StageWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn stage_thread(
    config: &StageConfig,
    mut chunk_rx: mpsc::Receiver<EncodedChunk>,
    mut command_rx: mpsc::Receiver<StageCommand>,
    frame_tx: mpsc::Sender<AudioFrame>,
    running: &AtomicBool,
) -> Result<()> {
    let mut stage = DecodeStage::new(config);

    log::info!("Decode stage started — output: {}", stage.output_format());

    while running.load(Ordering::Relaxed) {
        // Block until the next encoded chunk (or channel close).
        let Some(chunk) = chunk_rx.blocking_recv() else {
            log::info!("Chunk channel closed");
            break;
        };

        // Drain pending configuration commands before touching the data
        // path; this is the serialization point between control and data.
        while let Ok(command) = command_rx.try_recv() {
            if let Err(e) = stage.apply_command(&command) {
                log::error!("Reconfiguration failed: {}", e);
            }
        }

        // One caller-sized frame per chunk, tagged with the current output.
        let output = stage.output_format();
        let mut frame =
            AudioFrame::with_capacity(&output, AudioFrame::max_samples(output.sample_rate));

        match stage.process_chunk(&chunk, &mut frame) {
            Ok(true) => {
                if frame_tx.blocking_send(frame).is_err() {
                    log::warn!("Frame receiver dropped, stopping");
                    break;
                }
            }
            Ok(false) => {}
            Err(e) => {
                log::warn!("Chunk dropped: {}", e);
            }
        }
    }

    log::info!("Decode stage stopped");
    Ok(())
}
