//! Text conversion: plain text onto letter-sized pages of Courier.
//!
//! Undecodable bytes are replaced, never fatal; a half-valid log file
//! should still produce a readable PDF. Each source line is drawn once at
//! its natural position; there is no horizontal wrapping, only vertical
//! pagination when the cursor passes the bottom margin.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::output::ConversionJob;
use crate::pipeline::canvas::{PdfBuilder, TextGeometry};
use crate::progress::ProgressReporter;
use tracing::debug;

/// Steps: read, setup, layout-prep, write, save.
pub const STEPS: i64 = 5;

/// US Letter, in points.
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;

pub async fn convert(
    job: &ConversionJob,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
) -> Result<(), ConvertError> {
    let job = job.clone();
    let geometry = geometry_from(config);
    let reporter = reporter.clone();
    tokio::task::spawn_blocking(move || convert_blocking(&job, geometry, &reporter))
        .await
        .map_err(|e| ConvertError::Internal(format!("text conversion task panicked: {e}")))?
}

fn geometry_from(config: &ConversionConfig) -> TextGeometry {
    TextGeometry {
        page_width: PAGE_WIDTH,
        page_height: PAGE_HEIGHT,
        margin: config.margin_pt.round() as i64,
        font_size: config.font_size.round() as i64,
        line_height: config.line_height.round() as i64,
    }
}

fn convert_blocking(
    job: &ConversionJob,
    geometry: TextGeometry,
    reporter: &ProgressReporter,
) -> Result<(), ConvertError> {
    let bytes = std::fs::read(&job.source)
        .map_err(|e| ConvertError::conversion(format!("cannot read source: {e}")))?;
    let text = String::from_utf8_lossy(&bytes);
    reporter.step(1);

    let mut builder = PdfBuilder::new();
    reporter.step(2);

    let lines: Vec<String> = text.lines().map(str::to_owned).collect();
    let per_page = geometry.lines_per_page();
    debug!(
        "{}: {} lines, {} per page",
        job.source.display(),
        lines.len(),
        per_page
    );
    reporter.step(3);

    if lines.is_empty() {
        // An empty source still yields a one-page (blank) document.
        builder.add_text_page(geometry, &[])?;
    } else {
        for chunk in lines.chunks(per_page) {
            builder.add_text_page(geometry, chunk)?;
        }
    }
    reporter.step(4);

    builder.save(&job.output)?;
    reporter.step(5);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_in(dir: &std::path::Path, name: &str, contents: &[u8]) -> ConversionJob {
        let source = dir.join(name);
        std::fs::write(&source, contents).unwrap();
        ConversionJob::new(&source, dir)
    }

    fn reporter(job: &ConversionJob) -> ProgressReporter {
        ProgressReporter::new(None, &job.source, STEPS)
    }

    #[tokio::test]
    async fn short_file_is_one_page() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path(), "note.txt", b"hello\nworld\n");
        convert(&job, &ConversionConfig::default(), &reporter(&job))
            .await
            .unwrap();

        let doc = lopdf::Document::load(&job.output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[tokio::test]
    async fn long_file_paginates() {
        let dir = tempfile::tempdir().unwrap();
        // 47 lines fit one letter page at the default geometry; 100 lines
        // need three pages.
        let contents = (1..=100)
            .map(|n| format!("line {n}\n"))
            .collect::<String>();
        let job = job_in(dir.path(), "long.txt", contents.as_bytes());
        convert(&job, &ConversionConfig::default(), &reporter(&job))
            .await
            .unwrap();

        let doc = lopdf::Document::load(&job.output).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path(), "mixed.txt", b"ok\n\xff\xfe broken bytes\nstill ok\n");
        convert(&job, &ConversionConfig::default(), &reporter(&job))
            .await
            .unwrap();
        assert!(job.output.exists());
    }

    #[tokio::test]
    async fn empty_file_yields_blank_single_page() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path(), "empty.txt", b"");
        convert(&job, &ConversionConfig::default(), &reporter(&job))
            .await
            .unwrap();

        let doc = lopdf::Document::load(&job.output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[tokio::test]
    async fn missing_source_is_a_conversion_error() {
        let dir = tempfile::tempdir().unwrap();
        let job = ConversionJob::new(&dir.path().join("gone.txt"), dir.path());
        let err = convert(&job, &ConversionConfig::default(), &reporter(&job))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Conversion { .. }));
    }
}
