//! Progress reporting: normalized percentage events and the callback trait.
//!
//! Converters count their work in small fixed step sequences (the image
//! converter has four, the text converter five). [`percentage`] normalizes a
//! `(step, total)` pair into 0–100 so frontends never see converter-specific
//! step counts, and [`ProgressReporter`] binds that to one job's source file.
//!
//! # Why callbacks instead of channels?
//!
//! The callback trait is the least-invasive integration point: callers can
//! forward events to a progress bar, a channel, a WebSocket, or a log line
//! without the engine knowing how the host application communicates. A
//! channel-backed adapter is provided separately in [`crate::stream`] for
//! callers that prefer pull over push.
//!
//! All trait methods take owned arguments. An earlier revision passed
//! `&ConversionOutcome` and hit the "implementation of `Send` is not general
//! enough" HRTB error when the trait object crossed a `tokio::spawn`
//! boundary; owned parameters sidestep that entire class of problem.

use crate::output::ConversionOutcome;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Normalize a step count into a percentage, clamped to `[0, 100]`.
///
/// Pure function: `clamp(round(100 * step / total), 0, 100)`. Out-of-range
/// inputs (`step > total`, `step < 0`) clamp rather than wrap, so a
/// miscounted converter can never drive a progress bar backwards past its
/// bounds.
pub fn percentage(step: i64, total_steps: i64) -> u8 {
    if total_steps <= 0 {
        return 0;
    }
    let pct = (step as f64 * 100.0 / total_steps as f64).round();
    pct.clamp(0.0, 100.0) as u8
}

/// A single progress event for one file mid-conversion.
///
/// Within one job, `percent` is monotonically non-decreasing: converters
/// report strictly increasing step numbers against a fixed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Normalized completion, always in `[0, 100]`.
    pub percent: u8,
    /// Source file this event belongs to.
    pub file: PathBuf,
}

/// Per-job progress emitter handed to each converter.
///
/// Binds the configured callback (if any) to one job's source file and step
/// count, so converter code reads `reporter.step(2)` instead of threading
/// callback, path and totals through every function.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    file: PathBuf,
    total_steps: i64,
}

impl ProgressReporter {
    pub fn new(callback: Option<ProgressCallback>, file: &Path, total_steps: i64) -> Self {
        Self {
            callback,
            file: file.to_path_buf(),
            total_steps,
        }
    }

    /// Emit the event for step `step` of this job's fixed sequence.
    pub fn step(&self, step: i64) {
        if let Some(ref cb) = self.callback {
            cb.on_progress(ProgressEvent {
                percent: percentage(step, self.total_steps),
                file: self.file.clone(),
            });
        }
    }

    /// The same callback re-bound to a different step total.
    ///
    /// Used by the HTML converter when it delegates to the text converter:
    /// the fallback runs with the text converter's own five-step sequence.
    pub fn with_total(&self, total_steps: i64) -> Self {
        Self {
            callback: self.callback.clone(),
            file: self.file.clone(),
            total_steps,
        }
    }
}

/// Called by the worker and converters as a batch progresses.
///
/// Implementations must be `Send + Sync`: the batch runs on a background
/// task, and blocking converter stages fire events from `spawn_blocking`
/// threads. All methods have default no-op implementations so callers only
/// override what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first job starts.
    fn on_batch_start(&self, total_jobs: usize) {
        let _ = total_jobs;
    }

    /// Called zero or more times per job as its converter steps forward.
    fn on_progress(&self, event: ProgressEvent) {
        let _ = event;
    }

    /// Called once per job, after it succeeded or failed.
    fn on_job_complete(&self, outcome: ConversionOutcome) {
        let _ = outcome;
    }

    /// Called once after the last job, with every outcome in input order.
    fn on_batch_complete(&self, outcomes: Vec<ConversionOutcome>) {
        let _ = outcomes;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn percentage_table() {
        assert_eq!(percentage(1, 4), 25);
        assert_eq!(percentage(2, 4), 50);
        assert_eq!(percentage(3, 4), 75);
        assert_eq!(percentage(4, 4), 100);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
    }

    #[test]
    fn percentage_clamps_out_of_range_steps() {
        assert_eq!(percentage(5, 4), 100);
        assert_eq!(percentage(-1, 4), 0);
        assert_eq!(percentage(1000, 4), 100);
    }

    #[test]
    fn percentage_degenerate_totals() {
        assert_eq!(percentage(1, 0), 0);
        assert_eq!(percentage(1, -3), 0);
    }

    struct Recorder {
        events: Mutex<Vec<ProgressEvent>>,
        batches: AtomicUsize,
    }

    impl ConversionProgressCallback for Recorder {
        fn on_progress(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
        fn on_batch_complete(&self, _outcomes: Vec<ConversionOutcome>) {
            self.batches.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn reporter_emits_monotonic_events() {
        let rec = Arc::new(Recorder {
            events: Mutex::new(vec![]),
            batches: AtomicUsize::new(0),
        });
        let cb: ProgressCallback = Arc::clone(&rec) as ProgressCallback;

        let reporter = ProgressReporter::new(Some(cb), Path::new("a.txt"), 5);
        for s in 1..=5 {
            reporter.step(s);
        }

        let events = rec.events.lock().unwrap();
        let percents: Vec<u8> = events.iter().map(|e| e.percent).collect();
        assert_eq!(percents, vec![20, 40, 60, 80, 100]);
        assert!(events.iter().all(|e| e.file == Path::new("a.txt")));
    }

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new(None, Path::new("a.txt"), 4);
        reporter.step(1);
        reporter.step(4);
    }

    #[test]
    fn callback_object_moves_into_spawned_task() {
        // Compile-time guard: the trait object must stay Send across spawn.
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            tokio::spawn(async move {
                cb.on_batch_start(3);
            })
            .await
            .unwrap();
        });
    }
}
