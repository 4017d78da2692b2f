//! Image conversion: one source image onto one PDF page sized to match.
//!
//! ## Why spawn_blocking?
//!
//! Decoding a large PNG and flate-compressing its pixel data are CPU-bound
//! and can take hundreds of milliseconds. `tokio::task::spawn_blocking`
//! keeps that work off the async worker threads so progress events and
//! other runtime activity stay responsive.

use crate::error::ConvertError;
use crate::output::ConversionJob;
use crate::pipeline::canvas::{EncodedImage, PdfBuilder};
use crate::progress::ProgressReporter;
use image::{ColorType, DynamicImage};
use std::path::Path;
use tracing::debug;

/// Steps: open, create, draw, save.
pub const STEPS: i64 = 4;

pub async fn convert(job: &ConversionJob, reporter: &ProgressReporter) -> Result<(), ConvertError> {
    let job = job.clone();
    let reporter = reporter.clone();
    tokio::task::spawn_blocking(move || convert_blocking(&job, &reporter))
        .await
        .map_err(|e| ConvertError::Internal(format!("image conversion task panicked: {e}")))?
}

fn convert_blocking(job: &ConversionJob, reporter: &ProgressReporter) -> Result<(), ConvertError> {
    let img = image::open(&job.source)
        .map_err(|e| ConvertError::conversion(format!("cannot open image: {e}")))?;
    debug!(
        "opened {} ({}x{}, {:?})",
        job.source.display(),
        img.width(),
        img.height(),
        img.color()
    );
    reporter.step(1);

    let mut builder = PdfBuilder::new();
    reporter.step(2);

    builder.add_image_page(encode(&job.source, &job.extension, &img)?)?;
    reporter.step(3);

    builder.save(&job.output)?;
    reporter.step(4);
    Ok(())
}

/// Prepare the image payload for embedding.
///
/// JPEG sources pass through untouched under DCTDecode: the PDF viewer
/// decodes the original file bytes, so nothing is recompressed and quality
/// is preserved. Everything else is decoded to raw RGB samples and left for
/// the save-time flate pass.
fn encode(
    source: &Path,
    extension: &str,
    img: &DynamicImage,
) -> Result<EncodedImage, ConvertError> {
    if matches!(extension, "jpg" | "jpeg") {
        let data = std::fs::read(source)
            .map_err(|e| ConvertError::conversion(format!("cannot read image: {e}")))?;
        let color_space = match img.color() {
            ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16 => "DeviceGray",
            _ => "DeviceRGB",
        };
        return Ok(EncodedImage {
            width: img.width(),
            height: img.height(),
            color_space,
            filter: Some("DCTDecode"),
            data,
        });
    }

    let rgb = img.to_rgb8();
    Ok(EncodedImage {
        width: rgb.width(),
        height: rgb.height(),
        color_space: "DeviceRGB",
        filter: None,
        data: rgb.into_raw(),
    })
}
