//! Error types for the file2pdf library.
//!
//! One enum covers every failure the engine can produce. The variants fall
//! into two groups with different blast radii:
//!
//! * **Per-job** — [`ConvertError::UnsupportedFormat`], [`ConvertError::Conversion`],
//!   [`ConvertError::ToolNotFound`], [`ConvertError::ProcessTimeout`],
//!   [`ConvertError::ProcessFailed`]. These are caught at the job boundary
//!   inside the worker and recorded in a
//!   [`crate::output::ConversionOutcome`]; they never abort the batch.
//!
//! * **Setup** — [`ConvertError::InvalidConfig`], [`ConvertError::OutputWrite`]
//!   for the output directory itself. Returned from the top-level `convert_*`
//!   functions before any job runs.
//!
//! The timeout/exit-code split on subprocess failures is deliberate: callers
//! need to distinguish "the tool was too slow" (retry with a bigger budget,
//! or a smaller file) from "the tool rejected the input" (retrying is
//! pointless).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the file2pdf library.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The file's extension matches no registered format.
    #[error("unsupported file type: '{extension}'\nRun with --list-formats to see what is supported.")]
    UnsupportedFormat { extension: String },

    /// The external office-conversion tool could not be located by any
    /// resolution strategy. Fatal only for office-category jobs.
    #[error(
        "office conversion tool not found\n\
         Install LibreOffice, or point --office-tool at an existing soffice binary."
    )]
    ToolNotFound,

    /// A converter's own processing failed: undecodable image, I/O error,
    /// renderer crash, tool output missing.
    #[error("conversion failed: {detail}")]
    Conversion { detail: String },

    /// The external tool exceeded its time budget and was killed.
    #[error("external tool timed out after {secs}s")]
    ProcessTimeout { secs: u64 },

    /// The external tool exited with a non-zero status.
    #[error("external tool failed with exit code {code}: {stderr}")]
    ProcessFailed { code: i32, stderr: String },

    /// Could not create or write an output file or directory.
    #[error("failed to write output '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder or registry validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error (panicked worker task, poisoned state).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Wrap an arbitrary cause as a per-job conversion failure.
    pub(crate) fn conversion(detail: impl std::fmt::Display) -> Self {
        ConvertError::Conversion {
            detail: detail.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_names_extension() {
        let e = ConvertError::UnsupportedFormat {
            extension: "xyz".into(),
        };
        assert!(e.to_string().contains("'xyz'"), "got: {e}");
    }

    #[test]
    fn timeout_and_exit_failure_are_distinct() {
        let timeout = ConvertError::ProcessTimeout { secs: 120 };
        let failed = ConvertError::ProcessFailed {
            code: 77,
            stderr: "source file could not be loaded".into(),
        };
        assert!(timeout.to_string().contains("120s"));
        assert!(failed.to_string().contains("77"));
        assert!(failed.to_string().contains("could not be loaded"));
    }

    #[test]
    fn output_write_preserves_source() {
        use std::error::Error;
        let e = ConvertError::OutputWrite {
            path: PathBuf::from("/nope/out.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/nope/out.pdf"));
        assert!(e.source().is_some());
    }
}
