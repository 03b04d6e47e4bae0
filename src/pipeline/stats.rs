//! Session counters and metrics
//!
//! All fields use atomic operations so the serialized session task can
//! update them while the orchestrator and status consumers read live
//! snapshots without locking.

use std::sync::atomic::{AtomicU64, Ordering};

use super::types::StreamKind;

/// Counters for one recording session
///
/// Per-stream arrays are indexed by `StreamKind::index()`.
#[derive(Debug, Default)]
pub struct SessionStats {
    /// Samples accepted by the writer adapters, per stream
    accepted: [AtomicU64; 3],

    /// Samples dropped before or at the adapters (no origin yet,
    /// backpressure, session stopping), per stream
    dropped: [AtomicU64; 3],

    /// Samples the router could not enqueue (session channel full or
    /// closed), per stream
    router_drops: [AtomicU64; 3],

    /// Appends the underlying encoder rejected outside of backpressure
    append_failures: AtomicU64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_accepted(&self, kind: StreamKind) {
        self.accepted[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drop(&self, kind: StreamKind) {
        self.dropped[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_router_drop(&self, kind: StreamKind) {
        self.router_drops[kind.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_append_failure(&self) {
        self.append_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn accepted(&self, kind: StreamKind) -> u64 {
        self.accepted[kind.index()].load(Ordering::Relaxed)
    }

    pub fn dropped(&self, kind: StreamKind) -> u64 {
        self.dropped[kind.index()].load(Ordering::Relaxed)
    }

    pub fn router_drops(&self, kind: StreamKind) -> u64 {
        self.router_drops[kind.index()].load(Ordering::Relaxed)
    }

    pub fn append_failures(&self) -> u64 {
        self.append_failures.load(Ordering::Relaxed)
    }

    /// Get a point-in-time snapshot of all counters
    pub fn summary(&self) -> StatsSummary {
        let total = |c: &[AtomicU64; 3]| {
            c.iter().map(|v| v.load(Ordering::Relaxed)).sum::<u64>()
        };
        StatsSummary {
            video_accepted: self.accepted(StreamKind::Video),
            audio_accepted: self.accepted(StreamKind::SystemAudio),
            mic_accepted: self.accepted(StreamKind::Microphone),
            total_dropped: total(&self.dropped) + total(&self.router_drops),
            append_failures: self.append_failures(),
        }
    }
}

/// Snapshot of session counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSummary {
    pub video_accepted: u64,
    pub audio_accepted: u64,
    pub mic_accepted: u64,
    pub total_dropped: u64,
    pub append_failures: u64,
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} frames, {} audio samples, {} mic samples ({} dropped, {} append failures)",
            self.video_accepted,
            self.audio_accepted,
            self.mic_accepted,
            self.total_dropped,
            self.append_failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_per_stream() {
        let stats = SessionStats::new();

        stats.record_accepted(StreamKind::Video);
        stats.record_accepted(StreamKind::Video);
        stats.record_accepted(StreamKind::SystemAudio);
        stats.record_drop(StreamKind::Microphone);

        assert_eq!(stats.accepted(StreamKind::Video), 2);
        assert_eq!(stats.accepted(StreamKind::SystemAudio), 1);
        assert_eq!(stats.accepted(StreamKind::Microphone), 0);
        assert_eq!(stats.dropped(StreamKind::Microphone), 1);
        assert_eq!(stats.dropped(StreamKind::Video), 0);
    }

    #[test]
    fn test_summary() {
        let stats = SessionStats::new();

        stats.record_accepted(StreamKind::Video);
        stats.record_drop(StreamKind::SystemAudio);
        stats.record_router_drop(StreamKind::Video);
        stats.record_append_failure();

        let summary = stats.summary();
        assert_eq!(summary.video_accepted, 1);
        assert_eq!(summary.total_dropped, 2);
        assert_eq!(summary.append_failures, 1);
    }
}
