//! Format registry: the static extension → converter mapping.
//!
//! # Design choice: enum dispatch over name lookup
//!
//! Each descriptor carries an explicit [`ConverterKind`] tag and the worker
//! dispatches on it with a plain `match`. There is no string-keyed method
//! lookup anywhere, so "converter not found at runtime" is not a reachable
//! state: an unknown extension is the only failure mode and it is a typed
//! error.
//!
//! The registry is an immutable value. [`FormatRegistry::standard`] builds
//! the built-in table exactly once for the process; callers that need a
//! custom table (tests, embedders) construct their own via
//! [`FormatRegistry::new`], which enforces the pairwise-disjointness
//! invariant across extension sets.

use crate::error::ConvertError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The conversion strategy selected for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConverterKind {
    /// Raster images drawn onto a single PDF page sized to the image.
    Image,
    /// Plain text laid out with a built-in monospace font.
    Text,
    /// HTML rendered by an external renderer, with text fallback.
    Html,
    /// Office documents converted through the external office tool.
    Office,
}

impl ConverterKind {
    /// Short lowercase name used in logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            ConverterKind::Image => "image",
            ConverterKind::Text => "text",
            ConverterKind::Html => "html",
            ConverterKind::Office => "office",
        }
    }
}

/// One format family: its extensions, strategy and display label.
#[derive(Debug, Clone)]
pub struct FormatDescriptor {
    /// Extensions without the dot, lowercase.
    pub extensions: &'static [&'static str],
    pub kind: ConverterKind,
    /// Human-readable category name, for UI filter lists.
    pub label: &'static str,
}

/// Immutable extension → converter table.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    descriptors: Vec<FormatDescriptor>,
}

impl FormatRegistry {
    /// Build a registry, validating that no extension is claimed twice.
    pub fn new(descriptors: Vec<FormatDescriptor>) -> Result<Self, ConvertError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for d in &descriptors {
            for ext in d.extensions {
                if !seen.insert(ext) {
                    return Err(ConvertError::InvalidConfig(format!(
                        "extension '{ext}' is claimed by more than one format descriptor"
                    )));
                }
            }
        }
        Ok(FormatRegistry { descriptors })
    }

    /// The built-in table, constructed once per process.
    pub fn standard() -> &'static FormatRegistry {
        static STANDARD: Lazy<FormatRegistry> = Lazy::new(|| {
            FormatRegistry::new(vec![
                FormatDescriptor {
                    extensions: &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff"],
                    kind: ConverterKind::Image,
                    label: "Images",
                },
                FormatDescriptor {
                    extensions: &["txt", "md", "csv", "log"],
                    kind: ConverterKind::Text,
                    label: "Text files",
                },
                FormatDescriptor {
                    extensions: &["html", "htm"],
                    kind: ConverterKind::Html,
                    label: "Web pages",
                },
                FormatDescriptor {
                    extensions: &[
                        "doc", "docx", "odt", "rtf", "xls", "xlsx", "ods", "ppt", "pptx", "odp",
                    ],
                    kind: ConverterKind::Office,
                    label: "Office documents",
                },
            ])
            .expect("built-in format table must be disjoint")
        });
        &STANDARD
    }

    /// Map an extension (with or without leading dot, any case) to its
    /// converter. No side effects.
    pub fn resolve(&self, extension: &str) -> Result<ConverterKind, ConvertError> {
        let ext = extension.trim_start_matches('.');
        for d in &self.descriptors {
            if d.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
                return Ok(d.kind);
            }
        }
        Err(ConvertError::UnsupportedFormat {
            extension: extension.to_string(),
        })
    }

    /// Read-only enumeration of all descriptors, for building UI-facing
    /// filter and label lists.
    pub fn descriptors(&self) -> impl Iterator<Item = &FormatDescriptor> {
        self.descriptors.iter()
    }
}
