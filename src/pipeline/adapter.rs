//! Per-stream writer adapters
//!
//! A `WriterAdapter` sits between the serialized session task and one
//! encoder-input backend. It enforces the backpressure policy: the
//! producer side is never blocked, an input that cannot accept more data
//! simply loses the sample. Underlying append failures are recorded and
//! logged but never abort the session; they cascade harmlessly until the
//! user stops the recording.

use log::{debug, warn};
use std::sync::Arc;

use super::stats::SessionStats;
use super::types::{SampleBuffer, StreamKind};
use super::writer::WriterHandle;

/// Backend seam for one container track
///
/// Implemented by the ffmpeg track inputs and by test mocks, so any
/// encoder backend (hardware or software) can provide the same
/// backpressure contract.
pub trait EncoderInput: Send {
    /// Whether the underlying encoder can take another sample right now
    fn can_accept_more(&self) -> bool;

    /// Encode and enqueue one sample for the container
    fn append(&mut self, sample: &SampleBuffer) -> anyhow::Result<()>;

    /// Flush any buffered state into the container
    fn finish(&mut self) -> anyhow::Result<()>;
}

/// Adapter for one stream of a recording session
///
/// Created when the session starts, fed while it is active, finished
/// exactly once at stop. Never reused across sessions.
pub struct WriterAdapter {
    kind: StreamKind,
    input: Box<dyn EncoderInput>,
    writer: WriterHandle,
    stats: Arc<SessionStats>,
    accepted: u64,
    finished: bool,
}

impl WriterAdapter {
    pub fn new(
        kind: StreamKind,
        input: Box<dyn EncoderInput>,
        writer: WriterHandle,
        stats: Arc<SessionStats>,
    ) -> Self {
        Self {
            kind,
            input,
            writer,
            stats,
            accepted: 0,
            finished: false,
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Samples this adapter has accepted so far
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Offer one sample to the underlying input.
    ///
    /// Returns true when the sample was accepted. A false return is a
    /// silent drop (adapter finished, writer failed, or the input is not
    /// ready) or a recorded append failure; neither is fatal.
    pub fn append(&mut self, sample: &SampleBuffer) -> bool {
        if self.finished || self.writer.is_failed() || !self.input.can_accept_more() {
            self.stats.record_drop(self.kind);
            return false;
        }

        match self.input.append(sample) {
            Ok(()) => {
                self.accepted += 1;
                self.stats.record_accepted(self.kind);
                true
            }
            Err(e) => {
                self.stats.record_append_failure();
                // Lost frames are visible in the output; lost audio is a
                // click at worst.
                if self.kind == StreamKind::Video {
                    warn!("Failed to append video frame: {e}");
                } else {
                    debug!("Failed to append {} sample: {e}", self.kind);
                }
                false
            }
        }
    }

    /// Mark the adapter as no longer accepting input.
    ///
    /// Idempotent, and safe to call even if the adapter never received a
    /// sample.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        if let Err(e) = self.input.finish() {
            warn!("Failed to finish {} input: {e}", self.kind);
        }
        debug!("{} adapter finished after {} samples", self.kind, self.accepted);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
