//! Progress reporting for long-running imports.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::info;

/// Batch imports report every this many records, plus the final one.
pub const PROGRESS_INTERVAL: usize = 100;

/// Prefix carried by the progress message of a fatal import failure, so
/// subscribers can flag it without parsing error text.
pub const CRITICAL_ERROR_MARKER: &str = "critical error";

#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub message: String,
    pub progress: Option<usize>,
    pub total: Option<usize>,
}

/// Fire-and-forget sender over a broadcast channel. With no subscribers,
/// sends become no-ops; the import never blocks on its observers.
#[derive(Clone)]
pub struct ProgressSink {
    tx: broadcast::Sender<ProgressEvent>,
}

impl ProgressSink {
    pub fn new(tx: broadcast::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }

    pub fn send(&self, message: impl Into<String>, progress: Option<usize>, total: Option<usize>) {
        let event = ProgressEvent {
            message: message.into(),
            progress,
            total,
        };
        info!(target: "cardvault::import", "{}", event.message);
        let _ = self.tx.send(event);
    }
}
