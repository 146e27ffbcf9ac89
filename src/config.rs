//! Configuration types for image⇄PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. One struct carries every knob so a
//! tool instance can be cloned into blocking tasks without borrowing.

use crate::error::ToolboxError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raster scale applied to every PDF page: 1 PDF point becomes 2 pixels.
///
/// Fixed rather than configurable; it trades output size for legibility.
pub const RENDER_SCALE: f32 = 2.0;

/// Default page margin: 10 mm expressed in PDF points.
pub const DEFAULT_MARGIN_PTS: f32 = 28.35;

/// Download name for the Image→PDF artifact.
pub const PDF_DOWNLOAD_NAME: &str = "images-to-pdf.pdf";

/// Download name for the PDF→Images archive.
pub const ZIP_DOWNLOAD_NAME: &str = "pdf-to-images.zip";

/// Configuration for a conversion job.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use toolbox_pdf::{ConversionConfig, PageSize};
///
/// let config = ConversionConfig::builder()
///     .page_size(PageSize::Letter)
///     .margin_pts(36.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.page_size, PageSize::Letter);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Page size used for every page of an Image→PDF job. Default: A4 portrait.
    pub page_size: PageSize,

    /// Margin on all four sides of the page, in points. Default: 28.35 (10 mm).
    pub margin_pts: f32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Compression used for entries of the page archive. Default: Deflated.
    pub compression: ArchiveCompression,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress observer, invoked once per image or page.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            margin_pts: DEFAULT_MARGIN_PTS,
            password: None,
            compression: ArchiveCompression::default(),
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("page_size", &self.page_size)
            .field("margin_pts", &self.margin_pts)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("compression", &self.compression)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
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
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn margin_pts(mut self, margin: f32) -> Self {
        self.config.margin_pts = margin.max(0.0);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn compression(mut self, compression: ArchiveCompression) -> Self {
        self.config.compression = compression;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ToolboxError> {
        let c = &self.config;
        let (w, h) = c.page_size.dimensions();
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return Err(ToolboxError::InvalidConfig(format!(
                "Page size must be positive, got {w}×{h} pt"
            )));
        }
        if !c.margin_pts.is_finite() || c.margin_pts * 2.0 >= w.min(h) {
            return Err(ToolboxError::InvalidConfig(format!(
                "Margin of {} pt leaves no printable area on a {w}×{h} pt page",
                c.margin_pts
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output page size for Image→PDF, in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PageSize {
    /// ISO A4 portrait, 210 × 297 mm. (default)
    #[default]
    A4,
    /// US Letter portrait, 8.5 × 11 in.
    Letter,
    /// Arbitrary width × height in points.
    Custom { width: f32, height: f32 },
}

impl PageSize {
    /// `(width, height)` in points.
    pub fn dimensions(&self) -> (f32, f32) {
        match *self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Custom { width, height } => (width, height),
        }
    }
}

/// Compression method for `page-{n}.png` archive entries.
///
/// PNG data is already deflated, so `Stored` is faster at nearly the same size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArchiveCompression {
    Stored,
    #[default]
    Deflated,
}
