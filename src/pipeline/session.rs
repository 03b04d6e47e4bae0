//! Serialized sample processing
//!
//! All shared pipeline state (clock, adapters, writer handle) is owned by
//! one task fed from a bounded channel, so origin establishment, counter
//! updates, and appends are linearizable no matter how many delivery
//! contexts the capture service uses. The task itself never blocks on
//! I/O-conditioned readiness: an append that cannot proceed becomes a
//! counted drop.
//!
//! Stopping is cancellation-first: the select below is biased towards the
//! cancellation token, so samples already sitting in the channel when the
//! orchestrator stops are discarded rather than appended to a container
//! that is about to finalize.

use log::{debug, info};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::adapter::WriterAdapter;
use super::clock::SessionClock;
use super::stats::SessionStats;
use super::types::{SampleBuffer, StreamKind};
use super::writer::WriterHandle;

/// Capacity of the channel between producer contexts and the session task
pub const SESSION_CHANNEL_CAPACITY: usize = 256;

/// State handed back to the orchestrator when the session task exits
pub struct SessionParts {
    pub adapters: Vec<WriterAdapter>,
}

/// The serialized access point of one recording session
pub struct RecordingSession {
    rx: mpsc::Receiver<SampleBuffer>,
    cancel: CancellationToken,
    clock: SessionClock,
    writer: WriterHandle,
    adapters: Vec<WriterAdapter>,
    stats: Arc<SessionStats>,
}

impl RecordingSession {
    /// Spawn the session task.
    ///
    /// The task runs until the token is cancelled or every router clone
    /// is dropped, then returns the adapters to the caller for finishing.
    pub fn spawn(
        rx: mpsc::Receiver<SampleBuffer>,
        cancel: CancellationToken,
        writer: WriterHandle,
        adapters: Vec<WriterAdapter>,
        stats: Arc<SessionStats>,
    ) -> JoinHandle<SessionParts> {
        let session = Self {
            rx,
            cancel,
            clock: SessionClock::new(),
            writer,
            adapters,
            stats,
        };
        tokio::spawn(session.run())
    }

    async fn run(mut self) -> SessionParts {
        info!("Session task started");

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                sample = self.rx.recv() => {
                    match sample {
                        Some(sample) => self.process(sample),
                        None => break,
                    }
                }
            }
        }

        // Anything still queued arrived after the stop decision
        while let Ok(sample) = self.rx.try_recv() {
            self.stats.record_drop(sample.kind);
        }

        debug!("Session task exiting: {}", self.stats.summary());
        SessionParts {
            adapters: self.adapters,
        }
    }

    fn process(&mut self, sample: SampleBuffer) {
        match sample.kind {
            StreamKind::Video => {
                if self.clock.try_establish_origin(&sample)
                    && let Some(origin) = self.clock.origin()
                {
                    self.writer.begin_session(origin);
                }
                if !self.clock.has_origin() {
                    // Status-only frames preceding the first real one
                    self.stats.record_drop(StreamKind::Video);
                    return;
                }
                self.append(&sample);
            }
            kind => {
                if !self.clock.has_origin() {
                    // Audio stays muted until video anchors the session
                    self.stats.record_drop(kind);
                    return;
                }
                self.append(&sample);
            }
        }
    }

    fn append(&mut self, sample: &SampleBuffer) {
        match self
            .adapters
            .iter_mut()
            .find(|a| a.kind() == sample.kind)
        {
            // The adapter records acceptance or drop on its own
            Some(adapter) => {
                adapter.append(sample);
            }
            // Stream not enabled for this session
            None => self.stats.record_drop(sample.kind),
        }
    }
}
