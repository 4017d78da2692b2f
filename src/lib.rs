//! # file2pdf
//!
//! Convert heterogeneous input files (images, plain text, HTML, office
//! documents) to PDF.
//!
//! ## Why this crate?
//!
//! "Turn these files into PDFs" sounds like one problem but is four: images
//! want a page sized to the pixel grid, text wants pagination, HTML wants a
//! real renderer (which may not be installed), and office formats want
//! LibreOffice driven headless, which first has to be *found* across three
//! operating systems. This crate packages the dispatch, tool discovery,
//! progress reporting and partial-failure handling so callers just hand
//! over a list of paths.
//!
//! ## Pipeline Overview
//!
//! ```text
//! files
//!  │
//!  ├─ 1. Registry  extension → converter variant (case-insensitive)
//!  ├─ 2. Convert   Image │ Text │ Html (renderer probe + text fallback)
//!  │               │ Office (soffice --headless, located per platform)
//!  ├─ 3. Progress  per-step events normalised to 0–100
//!  └─ 4. Outcomes  one per file in input order; one bad file never
//!                  aborts the batch
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use file2pdf::{convert_batch, ConversionConfig};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let inputs = vec![PathBuf::from("scan.jpg"), PathBuf::from("notes.txt")];
//!     let report = convert_batch(&inputs, &config).await?;
//!     for outcome in &report.outcomes {
//!         match &outcome.error {
//!             None => println!("ok  {}", outcome.job.output.display()),
//!             Some(e) => eprintln!("err {}: {e}", outcome.job.source.display()),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `file2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! file2pdf = { version = "0.4", default-features = false }
//! ```
//!
//! ## External tools
//!
//! | Input | Needs | When absent |
//! |-------|-------|-------------|
//! | Images, text | nothing | — |
//! | HTML | wkhtmltopdf or a Chromium-family browser | falls back to text conversion |
//! | Office formats | LibreOffice (`soffice`) | those files fail, the rest of the batch continues |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod locate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, HtmlBackend};
pub use convert::{convert_batch, convert_batch_sync, convert_file, plan_jobs, spawn_batch};
pub use error::ConvertError;
pub use format::{ConverterKind, FormatDescriptor, FormatRegistry};
pub use locate::{ResolutionMethod, ToolPath};
pub use output::{BatchReport, BatchSummary, ConversionJob, ConversionOutcome};
pub use progress::{
    percentage, ConversionProgressCallback, NoopProgressCallback, ProgressCallback, ProgressEvent,
};
pub use stream::{convert_batch_stream, BatchEvent, BatchStream};
