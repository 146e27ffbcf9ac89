//! # toolbox-pdf
//!
//! Convert images to PDF and PDF pages to PNG images.
//!
//! Two tools share one lifecycle:
//!
//! * **Image → PDF** — ordered images are decoded, scaled to fit a fixed page
//!   (aspect ratio kept), centred, and appended one page per image. An image
//!   that fails to decode is skipped with a warning; the rest still land.
//! * **PDF → Images** — every page is rasterised at 2× scale, PNG-encoded,
//!   kept as a preview, and bundled into `pdf-to-images.zip` as
//!   `page-{n}.png`. Any failure aborts the job.
//!
//! ## Pipeline Overview
//!
//! ```text
//! select ─▶ validate (accept list, PDF probe) ─▶ Ready
//!                                                  │ convert
//!                                                  ▼
//!          Complete ◀─ publish handles ◀─ pipeline (spawn_blocking, sequential)
//! ```
//!
//! Outputs are exposed as [`PreviewHandle`]s: `blob:` URLs into a
//! [`HandleRegistry`]. A handle revokes itself when dropped, so replacing a
//! result or clearing a tool releases every blob it produced.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use toolbox_pdf::{pdf_to_images_tool, save_download, ConversionConfig, SourceFile, TracingNotifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tool = pdf_to_images_tool(ConversionConfig::default(), Arc::new(TracingNotifier));
//!     let bytes = std::fs::read("document.pdf")?;
//!     tool.select_files(vec![SourceFile::from_bytes("document.pdf", bytes)]).await;
//!
//!     let images = tool.convert().await?;
//!     println!("{} pages", images.pages.len());
//!     save_download(images, ".").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `toolbox-pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! pdfium is loaded at runtime; see [`pipeline::engine`] for the lookup order.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod handles;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod source;
pub mod stream;
pub mod tools;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ArchiveCompression, ConversionConfig, ConversionConfigBuilder, PageSize, RENDER_SCALE};
pub use controller::{Converter, InputSummary, SelectedInput, ToolController, ToolState};
pub use convert::{images_to_pdf_file, inspect, pdf_to_images_file, pdf_to_images_file_sync, PdfInfo};
pub use error::{SkippedImage, ToolboxError};
pub use handles::{Blob, HandleRegistry, PreviewHandle, RegistryStats};
pub use notify::{Notice, NoticeLevel, Notifier, NoopNotifier, RecordingNotifier, TracingNotifier};
pub use output::{save_download, Artifact, ConversionStats, ImageSetArtifact, PagePreview, PdfArtifact};
pub use pipeline::render::RenderedPage;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use source::{AcceptList, SourceFile};
pub use stream::{rasterize_stream, rasterize_stream_from, PageStream};
pub use tools::{images_to_pdf_tool, pdf_to_images_tool, ImagesToPdf, ImagesToPdfTool, PdfToImages, PdfToImagesTool};
