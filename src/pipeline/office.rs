//! Office conversion: drive the external tool as a bounded subprocess.
//!
//! The tool is invoked headless, once per job:
//!
//! ```text
//! soffice --headless --convert-to pdf --outdir <dir> <file>
//! ```
//!
//! It names its output after the source file's base name inside `--outdir`,
//! so after a successful run the generated file is renamed to the caller's
//! requested output path whenever the two differ.
//!
//! The invocation blocks the worker for at most the configured timeout
//! (120 s by default). That is an intentional bounded block on an isolated
//! task, not a deadlock risk. A timeout is reported distinctly from a non-zero
//! exit so callers can tell "too slow" from "the tool rejected the input".

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::locate;
use crate::output::ConversionJob;
use crate::progress::ProgressReporter;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};

/// Steps: locate tool, prepare, convert, done.
pub const STEPS: i64 = 4;

pub async fn convert(
    job: &ConversionJob,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
) -> Result<(), ConvertError> {
    let tool = locate::locate(config).await?;
    reporter.step(1);

    let outdir = job.output.parent().unwrap_or_else(|| Path::new("."));
    tokio::fs::create_dir_all(outdir)
        .await
        .map_err(|e| ConvertError::OutputWrite {
            path: outdir.to_path_buf(),
            source: e,
        })?;
    reporter.step(2);

    let mut cmd = Command::new(&tool.command);
    cmd.arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(outdir)
        .arg(&job.source)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    info!(
        "converting {} via {}",
        job.source.display(),
        tool.command.display()
    );

    let timeout = Duration::from_secs(config.office_timeout_secs);
    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(ConvertError::conversion(format!(
                "office tool could not be spawned: {e}"
            )))
        }
        Err(_) => {
            warn!(
                "office tool exceeded {}s on {}",
                config.office_timeout_secs,
                job.source.display()
            );
            return Err(ConvertError::ProcessTimeout {
                secs: config.office_timeout_secs,
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvertError::ProcessFailed {
            code: output.status.code().unwrap_or(-1),
            stderr: stderr.trim().chars().take(2000).collect(),
        });
    }
    reporter.step(3);

    let generated = outdir.join(generated_name(&job.source));
    finalize_output(&generated, &job.output)?;
    reporter.step(4);
    Ok(())
}

/// The filename the tool chooses on its own: source stem plus `.pdf`.
fn generated_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    format!("{stem}.pdf")
}

/// Move the tool's own output to the requested path.
///
/// When the two coincide nothing is touched; otherwise the generated file
/// is renamed so only the requested path remains. Either way the tool
/// claiming success without producing a file is an error here, not later
/// at the caller.
pub(crate) fn finalize_output(generated: &Path, requested: &Path) -> Result<(), ConvertError> {
    if generated == requested {
        if !requested.is_file() {
            return Err(ConvertError::conversion(
                "office tool reported success but produced no output file",
            ));
        }
        return Ok(());
    }

    if !generated.is_file() {
        return Err(ConvertError::conversion(format!(
            "office tool reported success but '{}' does not exist",
            generated.display()
        )));
    }

    std::fs::rename(generated, requested).map_err(|e| ConvertError::OutputWrite {
        path: requested.to_path_buf(),
        source: e,
    })
}
