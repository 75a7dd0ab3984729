//! Built-in display sinks.

use tokio::sync::watch;
use tracing::trace;

use super::traits::DisplaySink;
use super::types::{DisplayError, DisplaySnapshot};

/// Logs every frame at trace level. Useful for headless runs.
#[derive(Debug, Default)]
pub struct TracingDisplaySink;

impl DisplaySink for TracingDisplaySink {
    fn name(&self) -> &str {
        "tracing"
    }

    fn present(&self, snapshot: &DisplaySnapshot) -> Result<(), DisplayError> {
        trace!(
            panel = %snapshot.active_panel,
            staleness = ?snapshot.panel_staleness,
            ticker_generation = snapshot.ticker_generation,
            ticker = %snapshot.ticker_text,
            "Frame"
        );
        Ok(())
    }
}

/// Keeps the most recent frame for readers such as the HTTP API.
pub struct LatestSnapshotSink {
    tx: watch::Sender<Option<DisplaySnapshot>>,
}

impl Default for LatestSnapshotSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LatestSnapshotSink {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn latest(&self) -> Option<DisplaySnapshot> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<DisplaySnapshot>> {
        self.tx.subscribe()
    }
}

impl DisplaySink for LatestSnapshotSink {
    fn name(&self) -> &str {
        "latest"
    }

    fn present(&self, snapshot: &DisplaySnapshot) -> Result<(), DisplayError> {
        self.tx.send_replace(Some(snapshot.clone()));
        Ok(())
    }
}
