//! CLI binary for file2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and renders progress.

use anyhow::{Context, Result};
use clap::Parser;
use file2pdf::{
    convert_batch, ConversionConfig, ConversionOutcome, ConversionProgressCallback, FormatRegistry,
    HtmlBackend, ProgressCallback, ProgressEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar across the batch, a log line per
/// completed file, and the current file's percentage as the bar message.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_jobs: usize) {
        self.bar.set_length(total_jobs as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_jobs} file(s) to PDF…"))
        ));
    }

    fn on_progress(&self, event: ProgressEvent) {
        let name = event
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(format!("{name}  {}%", event.percent));
    }

    fn on_job_complete(&self, outcome: ConversionOutcome) {
        let name = outcome
            .job
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if outcome.success {
            self.bar.println(format!(
                "  {} {:<32}  {}",
                green("✓"),
                name,
                dim(&format!("{:.1}s", outcome.duration_ms as f64 / 1000.0)),
            ));
        } else {
            self.errors.fetch_add(1, Ordering::SeqCst);
            // Truncate very long error messages to keep the log tidy.
            let msg = outcome.error.unwrap_or_default();
            let msg = msg.lines().next().unwrap_or("");
            let msg = if msg.len() > 80 {
                format!("{}\u{2026}", &msg[..79])
            } else {
                msg.to_string()
            };
            self.bar
                .println(format!("  {} {:<32}  {}", red("✗"), name, red(&msg)));
        }
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, outcomes: Vec<ConversionOutcome>) {
        let failed = self.errors.load(Ordering::SeqCst);
        let total = outcomes.len();
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} file(s) converted successfully",
                green("✔"),
                bold(&total.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} file(s) converted  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&(total - failed).to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one file; the PDF lands next to it
  file2pdf scan.jpg

  # Convert a mixed batch into a directory
  file2pdf report.docx notes.txt chart.png -o ./pdfs

  # Machine-readable results
  file2pdf --json *.md > results.json

  # Point at a specific LibreOffice install
  file2pdf contract.odt --office-tool /opt/libreoffice/program/soffice

  # Force the text fallback for HTML (no renderer needed)
  file2pdf page.html --html-renderer none

  # What can be converted?
  file2pdf --list-formats

EXTERNAL TOOLS:
  Office formats need LibreOffice (soffice). It is discovered automatically:
  well-known install paths first, then the command search path. HTML uses
  wkhtmltopdf or a Chromium-family browser when present, and falls back to
  plain-text rendering when not; the batch never fails for a missing
  renderer.

ENVIRONMENT VARIABLES:
  FILE2PDF_OUTDIR        Default output directory
  FILE2PDF_OFFICE_TOOL   Path to the soffice binary
  RUST_LOG               Tracing filter (overrides -v/-q)
"#;

/// Convert images, text, HTML and office documents to PDF.
#[derive(Parser, Debug)]
#[command(
    name = "file2pdf",
    version,
    about = "Convert images, text, HTML and office documents to PDF",
    long_about = "Convert heterogeneous files to PDF in one batch. Images are drawn onto \
pages sized to the pixel grid, text is paginated with a monospace font, HTML goes through \
wkhtmltopdf/Chromium when available, and office formats are converted via headless LibreOffice.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input files to convert, processed in order.
    #[arg(required_unless_present = "list_formats")]
    inputs: Vec<PathBuf>,

    /// Output directory (default: the first input's directory).
    #[arg(short, long, env = "FILE2PDF_OUTDIR")]
    outdir: Option<PathBuf>,

    /// Path to the LibreOffice soffice binary; skips platform discovery.
    #[arg(long, env = "FILE2PDF_OFFICE_TOOL")]
    office_tool: Option<PathBuf>,

    /// Office-tool time budget per file, in seconds.
    #[arg(long, env = "FILE2PDF_TOOL_TIMEOUT", default_value_t = 120)]
    tool_timeout: u64,

    /// HTML renderer: auto, none, or a path to the renderer binary.
    #[arg(long, env = "FILE2PDF_HTML_RENDERER", default_value = "auto")]
    html_renderer: String,

    /// Output a JSON report instead of human-readable lines.
    #[arg(long)]
    json: bool,

    /// List supported input formats and exit.
    #[arg(long)]
    list_formats: bool,

    /// Disable the progress bar.
    #[arg(long, env = "FILE2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── List-formats mode ────────────────────────────────────────────────
    if cli.list_formats {
        for descriptor in FormatRegistry::standard().descriptors() {
            let exts = descriptor
                .extensions
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{:<18} {}", descriptor.label, dim(&exts));
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let report = convert_batch(&cli.inputs, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(json.as_bytes()).ok();
        handle.write_all(b"\n").ok();
    } else if !cli.quiet && !show_progress {
        // Plain per-file lines when the bar (which prints its own) is off.
        for outcome in &report.outcomes {
            match &outcome.error {
                None => println!("ok   {}", outcome.job.output.display()),
                Some(e) => println!("fail {}: {e}", outcome.job.source.display()),
            }
        }
        eprintln!(
            "Converted {}/{} file(s) in {}ms",
            report.summary.succeeded, report.summary.total, report.summary.duration_ms
        );
    }

    if report.summary.total > 0 && report.summary.succeeded == 0 {
        anyhow::bail!("all {} conversion(s) failed", report.summary.total);
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let html_backend = match cli.html_renderer.trim() {
        "auto" => HtmlBackend::Auto,
        "none" | "off" | "disabled" => HtmlBackend::Disabled,
        path => HtmlBackend::Command(PathBuf::from(path)),
    };

    let mut builder = ConversionConfig::builder()
        .office_timeout_secs(cli.tool_timeout)
        .html_backend(html_backend);

    if let Some(ref dir) = cli.outdir {
        builder = builder.output_dir(dir);
    }
    if let Some(ref tool) = cli.office_tool {
        builder = builder.office_tool(tool);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
