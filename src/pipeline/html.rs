//! HTML conversion: an external renderer when one is present, the text
//! converter when not.
//!
//! ## Why a probe instead of try-and-catch?
//!
//! The rendering capability (wkhtmltopdf, or a Chromium-family browser in
//! headless mode) may simply not exist on the host. That is an expected
//! configuration, not an error, so it is detected with an explicit probe
//! before anything runs and the fallback is an ordinary branch. Error types
//! stay reserved for renderers that exist and then fail: a crash or a
//! non-zero exit on actual content surfaces as a conversion error and does
//! NOT trigger the fallback.
//!
//! The probe runs before any progress is emitted, so a fallback run starts
//! the text converter's own step sequence from zero and percentages stay
//! monotonic within the job.

use crate::config::{ConversionConfig, HtmlBackend};
use crate::error::ConvertError;
use crate::locate::which_lookup;
use crate::output::ConversionJob;
use crate::pipeline::text;
use crate::progress::ProgressReporter;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Steps: read, convert, done.
pub const STEPS: i64 = 3;

/// Renderer binaries probed in order under [`HtmlBackend::Auto`].
const AUTO_CANDIDATES: &[&str] = &[
    "wkhtmltopdf",
    "chromium",
    "chromium-browser",
    "google-chrome",
    "chrome",
];

/// A resolved HTML renderer and the invocation style it needs.
#[derive(Debug, Clone)]
pub enum HtmlRenderer {
    WkHtmlToPdf(PathBuf),
    Chromium(PathBuf),
}

impl HtmlRenderer {
    /// Pick the invocation style from the binary name.
    fn classify(bin: PathBuf) -> Self {
        let name = bin
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if name.contains("wkhtmltopdf") {
            HtmlRenderer::WkHtmlToPdf(bin)
        } else {
            HtmlRenderer::Chromium(bin)
        }
    }

    fn command(&self, source: &Path, output: &Path) -> Command {
        match self {
            HtmlRenderer::WkHtmlToPdf(bin) => {
                let mut cmd = Command::new(bin);
                cmd.arg("--quiet").arg(source).arg(output);
                cmd
            }
            HtmlRenderer::Chromium(bin) => {
                let mut cmd = Command::new(bin);
                cmd.arg("--headless")
                    .arg("--disable-gpu")
                    .arg("--no-pdf-header-footer")
                    .arg(format!("--print-to-pdf={}", output.display()))
                    .arg(source);
                cmd
            }
        }
    }
}

pub async fn convert(
    job: &ConversionJob,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
) -> Result<(), ConvertError> {
    match probe(config).await {
        Some(renderer) => render(job, config, reporter, renderer).await,
        None => {
            info!(
                "no HTML renderer available; converting {} as plain text",
                job.source.display()
            );
            text::convert(job, config, &reporter.with_total(text::STEPS)).await
        }
    }
}

/// Capability probe: is an HTML renderer usable on this host?
///
/// Auto-mode results are memoized for the process lifetime: the set of
/// installed renderers does not change mid-run, and probing spawns a
/// subprocess per candidate.
async fn probe(config: &ConversionConfig) -> Option<HtmlRenderer> {
    match &config.html_backend {
        HtmlBackend::Disabled => None,
        HtmlBackend::Command(path) => Some(HtmlRenderer::classify(path.clone())),
        HtmlBackend::Auto => {
            static PROBED: OnceCell<Option<HtmlRenderer>> = OnceCell::const_new();
            let timeout = Duration::from_secs(config.locate_timeout_secs);
            PROBED
                .get_or_init(|| async move {
                    for candidate in AUTO_CANDIDATES {
                        if let Some(bin) = which_lookup(candidate, timeout).await {
                            debug!("HTML renderer found: {}", bin.display());
                            return Some(HtmlRenderer::classify(bin));
                        }
                    }
                    None
                })
                .await
                .clone()
        }
    }
}

async fn render(
    job: &ConversionJob,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
    renderer: HtmlRenderer,
) -> Result<(), ConvertError> {
    // The renderer reads the file itself; verify access up-front so a
    // missing source fails here rather than as an opaque subprocess error.
    tokio::fs::metadata(&job.source)
        .await
        .map_err(|e| ConvertError::conversion(format!("cannot read source: {e}")))?;
    reporter.step(1);

    let mut cmd = renderer.command(&job.source, &job.output);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let timeout = Duration::from_secs(config.html_timeout_secs);
    let result = tokio::time::timeout(timeout, cmd.output()).await;

    let output = match result {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(ConvertError::conversion(format!(
                "renderer could not be spawned: {e}"
            )))
        }
        Err(_) => {
            return Err(ConvertError::ProcessTimeout {
                secs: config.html_timeout_secs,
            })
        }
    };

    if !output.status.success() {
        // A present renderer rejecting the content is a conversion failure,
        // not a capability gap; the text fallback stays out of this path.
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvertError::conversion(format!(
            "renderer exited with {}: {}",
            output.status,
            stderr.trim().chars().take(500).collect::<String>()
        )));
    }

    if !job.output.is_file() {
        return Err(ConvertError::conversion(
            "renderer reported success but produced no output file",
        ));
    }
    reporter.step(2);

    reporter.step(3);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_binary_name() {
        assert!(matches!(
            HtmlRenderer::classify(PathBuf::from("/usr/local/bin/wkhtmltopdf")),
            HtmlRenderer::WkHtmlToPdf(_)
        ));
        assert!(matches!(
            HtmlRenderer::classify(PathBuf::from("/usr/bin/chromium-browser")),
            HtmlRenderer::Chromium(_)
        ));
        assert!(matches!(
            HtmlRenderer::classify(PathBuf::from("google-chrome")),
            HtmlRenderer::Chromium(_)
        ));
    }

    #[tokio::test]
    async fn disabled_backend_probes_absent() {
        let config = ConversionConfig::builder()
            .html_backend(HtmlBackend::Disabled)
            .build()
            .unwrap();
        assert!(probe(&config).await.is_none());
    }

    #[tokio::test]
    async fn explicit_command_skips_probing() {
        let config = ConversionConfig::builder()
            .html_backend(HtmlBackend::Command(PathBuf::from("/opt/wkhtmltopdf")))
            .build()
            .unwrap();
        assert!(matches!(
            probe(&config).await,
            Some(HtmlRenderer::WkHtmlToPdf(_))
        ));
    }

    #[tokio::test]
    async fn disabled_backend_falls_back_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("page.html");
        std::fs::write(&source, b"<html><body><p>hi</p></body></html>").unwrap();

        let config = ConversionConfig::builder()
            .html_backend(HtmlBackend::Disabled)
            .build()
            .unwrap();
        let job = ConversionJob::new(&source, dir.path());
        let reporter = ProgressReporter::new(None, &source, STEPS);

        convert(&job, &config, &reporter).await.unwrap();

        // The fallback produced a real PDF via the text converter.
        let doc = lopdf::Document::load(&job.output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_renderer_is_an_error_not_a_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("page.html");
        std::fs::write(&source, b"<html></html>").unwrap();

        // `false` exists everywhere and exits non-zero without reading args.
        let config = ConversionConfig::builder()
            .html_backend(HtmlBackend::Command(PathBuf::from("false")))
            .build()
            .unwrap();
        let job = ConversionJob::new(&source, dir.path());
        let reporter = ProgressReporter::new(None, &source, STEPS);

        let err = convert(&job, &config, &reporter).await.unwrap_err();
        assert!(matches!(err, ConvertError::Conversion { .. }), "got {err:?}");
        assert!(!job.output.exists(), "fallback must not have produced output");
    }
}
