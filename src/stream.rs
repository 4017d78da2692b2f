//! Streaming batch API: pull conversion events instead of receiving
//! callbacks.
//!
//! ## Why a stream?
//!
//! The callback trait is push-style and suits progress bars; async
//! frontends (a web handler forwarding events over a WebSocket, a TUI
//! select-loop) usually want to pull. [`convert_batch_stream`] adapts the
//! engine's callback seam onto a channel-backed `Stream` without the
//! engine knowing the difference: events arrive in emission order, ending
//! with exactly one terminal [`BatchEvent::BatchCompleted`] (or
//! [`BatchEvent::SetupFailed`]).

use crate::config::ConversionConfig;
use crate::convert::convert_batch;
use crate::output::{BatchSummary, ConversionOutcome};
use crate::progress::{ConversionProgressCallback, ProgressEvent};
use futures::Stream;
use serde::Serialize;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// One event in a batch's lifetime, in emission order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    /// The batch started; `total_jobs` conversions will be attempted.
    Started { total_jobs: usize },
    /// A converter stepped forward on the current file.
    Progress(ProgressEvent),
    /// One job finished, successfully or not.
    JobCompleted(ConversionOutcome),
    /// Terminal: every job was attempted.
    BatchCompleted(BatchSummary),
    /// Terminal: the batch could not start (setup error); no jobs ran.
    SetupFailed { error: String },
}

/// A boxed stream of batch events.
pub type BatchStream = Pin<Box<dyn Stream<Item = BatchEvent> + Send>>;

/// Forwards callback invocations into the channel. Send failures mean the
/// receiver was dropped, which is the caller's way of saying it stopped
/// listening, so they are ignored.
struct ChannelCallback {
    tx: mpsc::UnboundedSender<BatchEvent>,
}

impl ConversionProgressCallback for ChannelCallback {
    fn on_batch_start(&self, total_jobs: usize) {
        let _ = self.tx.send(BatchEvent::Started { total_jobs });
    }
    fn on_progress(&self, event: ProgressEvent) {
        let _ = self.tx.send(BatchEvent::Progress(event));
    }
    fn on_job_complete(&self, outcome: ConversionOutcome) {
        let _ = self.tx.send(BatchEvent::JobCompleted(outcome));
    }
}

/// Convert a batch, emitting events as it runs.
///
/// The batch runs on its own background task; dropping the stream stops
/// delivery but not the conversions already in flight (there is no
/// mid-flight cancellation). Any progress callback already present in
/// `config` is replaced by the stream's internal one.
pub fn convert_batch_stream(inputs: Vec<PathBuf>, mut config: ConversionConfig) -> BatchStream {
    let (tx, rx) = mpsc::unbounded_channel();
    config.progress_callback = Some(Arc::new(ChannelCallback { tx: tx.clone() }));

    tokio::spawn(async move {
        match convert_batch(&inputs, &config).await {
            Ok(report) => {
                let _ = tx.send(BatchEvent::BatchCompleted(report.summary));
            }
            Err(e) => {
                let _ = tx.send(BatchEvent::SetupFailed {
                    error: e.to_string(),
                });
            }
        }
    });

    Box::pin(UnboundedReceiverStream::new(rx))
}
