//! User-facing status feed
//!
//! One mutable status line reflecting the current lifecycle phase. The
//! feed exposes a snapshot plus a subscribe contract so a front-end can
//! react to changes without the core knowing anything about it.

use log::info;
use tokio::sync::watch;

#[derive(Clone)]
pub struct StatusFeed {
    tx: watch::Sender<String>,
}

impl StatusFeed {
    pub fn new(initial: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(initial.into());
        Self { tx }
    }

    /// Replace the status line and notify subscribers
    pub fn set(&self, status: impl Into<String>) {
        let status = status.into();
        info!("Status: {status}");
        self.tx.send_replace(status);
    }

    /// Read the current status line
    pub fn snapshot(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Subscribe to status changes
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for StatusFeed {
    fn default() -> Self {
        Self::new("Ready")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_follows_set() {
        let feed = StatusFeed::new("Ready");
        assert_eq!(feed.snapshot(), "Ready");

        feed.set("Recording...");
        assert_eq!(feed.snapshot(), "Recording...");
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let feed = StatusFeed::new("Ready");
        let mut rx = feed.subscribe();

        feed.set("Recording...");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().clone(), "Recording...");
    }
}
