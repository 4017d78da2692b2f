//! Batch worker: plan jobs, run them sequentially, collect outcomes.
//!
//! ## Why strictly sequential?
//!
//! The office tool is a shared, stateful external process best invoked one
//! document at a time, and per-file progress reporting only makes sense
//! when one file is in flight. So jobs in a batch never run concurrently;
//! the parallelism boundary is the batch itself, which runs on its own
//! task ([`spawn_batch`]) so interactive callers stay responsive while a
//! conversion blocks for up to the office timeout.
//!
//! ## Partial failure
//!
//! Every per-job error is caught at the job boundary and recorded as a
//! failed [`ConversionOutcome`]; one bad file never aborts the batch. The
//! batch always completes with exactly one outcome per job, in input order.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::format::FormatRegistry;
use crate::output::{BatchReport, ConversionJob, ConversionOutcome};
use crate::pipeline;
use crate::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Plan one job per input file.
///
/// The output directory is, in order: the configured `output_dir`, else the
/// first input's parent directory, else the current directory. Planning
/// never fails: unsupported or extensionless files become jobs that fail
/// at dispatch.
pub fn plan_jobs(inputs: &[PathBuf], config: &ConversionConfig) -> Vec<ConversionJob> {
    let default_dir = config
        .output_dir
        .clone()
        .or_else(|| {
            inputs
                .first()
                .and_then(|p| p.parent())
                .map(Path::to_path_buf)
        })
        .unwrap_or_else(|| PathBuf::from("."));

    inputs
        .iter()
        .map(|source| ConversionJob::new(source, &default_dir))
        .collect()
}

/// Convert a batch of files to PDF.
///
/// This is the primary entry point for the library. Returns a report with
/// one outcome per input in input order — `Ok` even when some (or all)
/// files failed; inspect `report.summary.failed`.
///
/// # Errors
/// Only for setup problems: a configured output directory that cannot be
/// created.
pub async fn convert_batch(
    inputs: &[PathBuf],
    config: &ConversionConfig,
) -> Result<BatchReport, ConvertError> {
    if let Some(ref dir) = config.output_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ConvertError::OutputWrite {
                path: dir.clone(),
                source: e,
            })?;
    }

    let jobs = plan_jobs(inputs, config);
    info!("starting batch of {} file(s)", jobs.len());
    let start = Instant::now();

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(jobs.len());
    }

    let outcomes = run_jobs(jobs, config).await;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(outcomes.clone());
    }

    let report = BatchReport::from_outcomes(outcomes, start.elapsed().as_millis() as u64);
    info!(
        "batch complete: {}/{} succeeded in {}ms",
        report.summary.succeeded, report.summary.total, report.summary.duration_ms
    );
    Ok(report)
}

/// Convert a single file; shorthand for a one-element batch.
pub async fn convert_file(
    input: &Path,
    config: &ConversionConfig,
) -> Result<ConversionOutcome, ConvertError> {
    let inputs = vec![input.to_path_buf()];
    let mut report = convert_batch(&inputs, config).await?;
    report
        .outcomes
        .pop()
        .ok_or_else(|| ConvertError::Internal("batch of one produced no outcome".into()))
}

/// Synchronous wrapper around [`convert_batch`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_batch_sync(
    inputs: &[PathBuf],
    config: &ConversionConfig,
) -> Result<BatchReport, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(convert_batch(inputs, config))
}

/// Run the batch on a dedicated background task.
///
/// The handle resolves to the report once the last job finishes; progress
/// arrives through the configured callback in the meantime. There is no
/// way to cancel a job once its converter has started; the office timeout
/// is the only bound (a known limitation, callers must design around it).
pub fn spawn_batch(inputs: Vec<PathBuf>, config: ConversionConfig) -> JoinHandle<BatchReport> {
    tokio::spawn(async move {
        match convert_batch(&inputs, &config).await {
            Ok(report) => report,
            Err(e) => {
                // Setup failures surface as a report where every job failed,
                // so the handle's type stays uniform for callers.
                warn!("batch setup failed: {e}");
                let jobs = plan_jobs(&inputs, &config);
                let outcomes = jobs
                    .into_iter()
                    .map(|job| ConversionOutcome::failed(job, &e, 0))
                    .collect();
                BatchReport::from_outcomes(outcomes, 0)
            }
        }
    })
}

/// The sequential per-job loop.
async fn run_jobs(jobs: Vec<ConversionJob>, config: &ConversionConfig) -> Vec<ConversionOutcome> {
    let registry = FormatRegistry::standard();
    let mut outcomes = Vec::with_capacity(jobs.len());

    for job in jobs {
        let started = Instant::now();
        let result = run_one(&job, registry, config).await;
        let elapsed = started.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(()) => ConversionOutcome::succeeded(job, elapsed),
            Err(e) => {
                warn!("{} failed: {e}", job.source.display());
                ConversionOutcome::failed(job, &e, elapsed)
            }
        };

        if let Some(ref cb) = config.progress_callback {
            cb.on_job_complete(outcome.clone());
        }
        outcomes.push(outcome);
    }

    outcomes
}

async fn run_one(
    job: &ConversionJob,
    registry: &FormatRegistry,
    config: &ConversionConfig,
) -> Result<(), ConvertError> {
    let kind = registry.resolve(&job.extension)?;
    let reporter = ProgressReporter::new(
        config.progress_callback.clone(),
        &job.source,
        pipeline::steps_for(kind),
    );
    info!(
        "{} -> {} ({})",
        job.source.display(),
        job.output.display(),
        kind.name()
    );
    pipeline::run(kind, job, config, &reporter).await
}
