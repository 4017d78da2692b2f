//! Job and outcome types: what goes into a batch and what comes out.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One file's conversion task within a batch.
///
/// Immutable once created; consumed exactly once by the worker. The output
/// path is fully resolved at planning time so converters never compute
/// destinations themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionJob {
    /// Input file.
    pub source: PathBuf,
    /// Resolved destination, always `<outdir>/<stem>.pdf`.
    pub output: PathBuf,
    /// Lowercased extension without the dot; empty when the source has none.
    pub extension: String,
}

impl ConversionJob {
    /// Plan a job for `source`, writing into `output_dir`.
    ///
    /// Never fails: an extensionless or unknown file still becomes a job and
    /// surfaces as an unsupported-format outcome at dispatch, keeping the
    /// partial-failure path uniform.
    pub fn new(source: &Path, output_dir: &Path) -> Self {
        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        ConversionJob {
            source: source.to_path_buf(),
            output: output_dir.join(format!("{stem}.pdf")),
            extension,
        }
    }
}

/// The recorded result of one job.
///
/// `error` is `Some` iff `success` is false. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub job: ConversionJob,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl ConversionOutcome {
    pub fn succeeded(job: ConversionJob, duration_ms: u64) -> Self {
        ConversionOutcome {
            job,
            success: true,
            error: None,
            duration_ms,
        }
    }

    pub fn failed(job: ConversionJob, error: impl std::fmt::Display, duration_ms: u64) -> Self {
        ConversionOutcome {
            job,
            success: false,
            error: Some(error.to_string()),
            duration_ms,
        }
    }
}

/// Aggregate counters for one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

/// Everything a batch run produced: per-file outcomes in input order plus
/// the aggregate summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<ConversionOutcome>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub(crate) fn from_outcomes(outcomes: Vec<ConversionOutcome>, duration_ms: u64) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        let summary = BatchSummary {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            duration_ms,
        };
        BatchReport { outcomes, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_lowercases_extension() {
        let job = ConversionJob::new(Path::new("/data/Scan.JPG"), Path::new("/out"));
        assert_eq!(job.extension, "jpg");
        assert_eq!(job.output, Path::new("/out/Scan.pdf"));
    }

    #[test]
    fn job_without_extension_is_planned_anyway() {
        let job = ConversionJob::new(Path::new("/data/README"), Path::new("/out"));
        assert_eq!(job.extension, "");
        assert_eq!(job.output, Path::new("/out/README.pdf"));
    }

    #[test]
    fn report_counts_partial_failure() {
        let job = |n: &str| ConversionJob::new(Path::new(n), Path::new("/out"));
        let report = BatchReport::from_outcomes(
            vec![
                ConversionOutcome::succeeded(job("a.txt"), 5),
                ConversionOutcome::failed(job("b.xyz"), "unsupported file type: 'xyz'", 0),
                ConversionOutcome::succeeded(job("c.txt"), 7),
            ],
            12,
        );
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(report.summary.failed, 1);
        assert!(report.outcomes[1].error.as_deref().unwrap().contains("xyz"));
    }

    #[test]
    fn outcome_serialises_to_json() {
        let o = ConversionOutcome::failed(
            ConversionJob::new(Path::new("x.html"), Path::new(".")),
            "renderer crashed",
            42,
        );
        let json = serde_json::to_string(&o).unwrap();
        assert!(json.contains("renderer crashed"));
        let back: ConversionOutcome = serde_json::from_str(&json).unwrap();
        assert!(!back.success);
    }
}
