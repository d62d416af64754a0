//! Caller-facing progress log.
//!
//! The pipeline pushes human-readable lines into an unbounded channel: the
//! encode never blocks on a slow reader, and lines arrive in emission order.

use tokio::sync::mpsc;

/// Receiving half of the progress log; drained by the caller.
pub type EncodeLog = mpsc::UnboundedReceiver<String>;

/// Write-only, ordered sink for progress lines.
#[derive(Debug, Clone)]
pub struct EncodeLogSink {
    tx: Option<mpsc::UnboundedSender<String>>,
}

/// Create a connected sink/receiver pair.
pub fn log_channel() -> (EncodeLogSink, EncodeLog) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EncodeLogSink { tx: Some(tx) }, rx)
}

impl EncodeLogSink {
    /// A sink whose lines only reach `tracing`.
    pub fn discard() -> Self {
        Self { tx: None }
    }

    /// Append one line.
    pub fn emit(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(target: "ladderforge::encode", "{line}");

        if let Some(ref tx) = self.tx {
            if tx.send(line).is_err() {
                tracing::debug!("Encode log receiver dropped; line not delivered");
            }
        }
    }
}
