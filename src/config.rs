//! Configuration for batch conversion.
//!
//! All engine behaviour is controlled through [`ConversionConfig`], built via
//! its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config across the worker task, clone it into spawned
//! batches, and log it when diagnosing why two runs behaved differently.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor breaks on every new field. The builder lets
//! callers set only what they care about and rely on documented defaults.

use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for a conversion batch.
///
/// Built via [`ConversionConfig::builder()`] or [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use file2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .output_dir("/tmp/pdfs")
///     .office_timeout_secs(180)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Directory PDFs are written into. Default: None.
    ///
    /// When unset, the worker uses the directory of the first input file,
    /// the behaviour desktop users expect ("the PDF appears next to my
    /// file").
    pub output_dir: Option<PathBuf>,

    /// Explicit path to the office-conversion binary. Default: None.
    ///
    /// When set, platform discovery is skipped entirely; the path is used
    /// as-is for every office job. Useful for containers and CI where the
    /// install location is known and probing is wasted work.
    pub office_tool: Option<PathBuf>,

    /// Time budget for one office-tool invocation, in seconds. Default: 120.
    ///
    /// LibreOffice cold-starts can take 10–20 s on their own; large
    /// spreadsheets another minute. The subprocess is killed when the budget
    /// expires and the job fails with a timeout error, which callers can
    /// distinguish from the tool rejecting the input.
    pub office_timeout_secs: u64,

    /// Time budget for the search-path lookup subprocess (`which`/`where`),
    /// in seconds. Default: 5.
    pub locate_timeout_secs: u64,

    /// HTML rendering backend selection. Default: [`HtmlBackend::Auto`].
    pub html_backend: HtmlBackend,

    /// Time budget for one HTML-renderer invocation, in seconds. Default: 60.
    pub html_timeout_secs: u64,

    /// Font size for text conversion, in points. Default: 10.0.
    pub font_size: f32,

    /// Line advance for text conversion, in points. Default: 14.0.
    pub line_height: f32,

    /// Page margin for text conversion, in points. Default: 72.0 (one inch).
    pub margin_pt: f32,

    /// Progress callback invoked from the worker task. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

/// How the HTML converter finds its renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HtmlBackend {
    /// Probe the search path for a known renderer (wkhtmltopdf, then a
    /// Chromium-family browser). (default)
    #[default]
    Auto,
    /// Use exactly this binary.
    Command(PathBuf),
    /// Treat the rendering capability as absent; HTML inputs take the text
    /// fallback. This is the switch tests and minimal deployments use.
    Disabled,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            office_tool: None,
            office_timeout_secs: 120,
            locate_timeout_secs: 5,
            html_backend: HtmlBackend::default(),
            html_timeout_secs: 60,
            font_size: 10.0,
            line_height: 14.0,
            margin_pt: 72.0,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output_dir", &self.output_dir)
            .field("office_tool", &self.office_tool)
            .field("office_timeout_secs", &self.office_timeout_secs)
            .field("locate_timeout_secs", &self.locate_timeout_secs)
            .field("html_backend", &self.html_backend)
            .field("html_timeout_secs", &self.html_timeout_secs)
            .field("font_size", &self.font_size)
            .field("line_height", &self.line_height)
            .field("margin_pt", &self.margin_pt)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn office_tool(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.office_tool = Some(path.into());
        self
    }

    pub fn office_timeout_secs(mut self, secs: u64) -> Self {
        self.config.office_timeout_secs = secs.max(1);
        self
    }

    pub fn locate_timeout_secs(mut self, secs: u64) -> Self {
        self.config.locate_timeout_secs = secs.max(1);
        self
    }

    pub fn html_backend(mut self, backend: HtmlBackend) -> Self {
        self.config.html_backend = backend;
        self
    }

    pub fn html_timeout_secs(mut self, secs: u64) -> Self {
        self.config.html_timeout_secs = secs.max(1);
        self
    }

    pub fn font_size(mut self, pt: f32) -> Self {
        self.config.font_size = pt;
        self
    }

    pub fn line_height(mut self, pt: f32) -> Self {
        self.config.line_height = pt;
        self
    }

    pub fn margin_pt(mut self, pt: f32) -> Self {
        self.config.margin_pt = pt;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if !(c.font_size > 0.0) {
            return Err(ConvertError::InvalidConfig(format!(
                "font size must be positive, got {}",
                c.font_size
            )));
        }
        if c.line_height < c.font_size {
            return Err(ConvertError::InvalidConfig(format!(
                "line height {} is smaller than font size {}",
                c.line_height, c.font_size
            )));
        }
        if !(c.margin_pt >= 0.0) {
            return Err(ConvertError::InvalidConfig(format!(
                "margin must be non-negative, got {}",
                c.margin_pt
            )));
        }
        Ok(self.config)
    }
}
