//! Conversion strategies, one submodule per converter variant.
//!
//! Keeping strategies separate makes each independently testable and lets
//! us swap an implementation (e.g. a different HTML renderer) without
//! touching the others.
//!
//! ## Data flow
//!
//! ```text
//! job ──▶ dispatch ──▶ image | text | html | office ──▶ output PDF
//!         (by kind)    (canvas)      (canvas/subprocess)
//! ```
//!
//! 1. [`canvas`] — shared PDF construction over lopdf
//! 2. [`image`]  — single page sized to the source image
//! 3. [`text`]   — paginated monospace pages; also the HTML fallback target
//! 4. [`html`]   — external renderer with capability probe
//! 5. [`office`] — external office tool as a bounded subprocess

pub mod canvas;
pub mod html;
pub mod image;
pub mod office;
pub mod text;

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::format::ConverterKind;
use crate::output::ConversionJob;
use crate::progress::ProgressReporter;

/// Fixed step count for each converter variant's progress sequence.
pub fn steps_for(kind: ConverterKind) -> i64 {
    match kind {
        ConverterKind::Image => image::STEPS,
        ConverterKind::Text => text::STEPS,
        ConverterKind::Html => html::STEPS,
        ConverterKind::Office => office::STEPS,
    }
}

/// Statically-typed dispatch from converter variant to implementation.
pub async fn run(
    kind: ConverterKind,
    job: &ConversionJob,
    config: &ConversionConfig,
    reporter: &ProgressReporter,
) -> Result<(), ConvertError> {
    match kind {
        ConverterKind::Image => image::convert(job, reporter).await,
        ConverterKind::Text => text::convert(job, config, reporter).await,
        ConverterKind::Html => html::convert(job, config, reporter).await,
        ConverterKind::Office => office::convert(job, config, reporter).await,
    }
}
