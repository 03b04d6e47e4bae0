//! Sample router: the nonisolated entry point for delivered samples
//!
//! Each capture delivery context holds a clone of the router and calls
//! [`SampleRouter::route`] for every sample. The call never blocks and
//! never does work inline; it hands the sample to the serialized session
//! channel and returns. When the channel is full (the session task is
//! behind) or closed (the session is gone), the sample is silently
//! dropped and counted; the delivery source must never be stalled.

use log::trace;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::pipeline::stats::SessionStats;
use crate::pipeline::types::SampleBuffer;

/// Cheap-to-clone sender handle into the session task
#[derive(Clone)]
pub struct SampleRouter {
    tx: mpsc::Sender<SampleBuffer>,
    stats: Arc<SessionStats>,
}

impl SampleRouter {
    pub fn new(tx: mpsc::Sender<SampleBuffer>, stats: Arc<SessionStats>) -> Self {
        Self { tx, stats }
    }

    /// Dispatch one sample towards the session task.
    ///
    /// Non-blocking and callable concurrently from any number of delivery
    /// contexts. The only side effect is an eventual append or a counted
    /// drop.
    pub fn route(&self, sample: SampleBuffer) {
        let kind = sample.kind;
        match self.tx.try_send(sample) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                trace!("Session channel full, dropping {kind} sample");
                self.stats.record_router_drop(kind);
            }
            Err(TrySendError::Closed(_)) => {
                // Session already gone; late deliveries are expected
                // while the capture service winds down
                self.stats.record_router_drop(kind);
            }
        }
    }

    /// Whether the session side is still listening. Delivery loops may
    /// use this to stop producing early.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
