//! One-call entry points for callers that don't need a tool controller.
//!
//! Each function resolves its inputs, drives the matching tool through a
//! full `select → convert` cycle with a [`TracingNotifier`], and writes the
//! download to disk. Use [`crate::tools`] directly when you need previews,
//! notices, or repeated conversions.

use crate::config::ConversionConfig;
use crate::error::ToolboxError;
use crate::notify::TracingNotifier;
use crate::output::{save_download, Artifact, ConversionStats};
use crate::pipeline::{input, render};
use crate::tools::{images_to_pdf_tool, pdf_to_images_tool};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// What [`inspect`] reports about a PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfInfo {
    pub name: String,
    pub page_count: usize,
    pub size_bytes: usize,
}

/// Count the pages of a PDF file or URL without rendering.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<PdfInfo, ToolboxError> {
    let pdf = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let page_count = render::probe_page_count(&pdf, config.password.as_deref()).await?;
    Ok(PdfInfo {
        name: pdf.name().to_string(),
        page_count,
        size_bytes: pdf.size(),
    })
}

/// Convert images (paths or URLs, in order) into one PDF at `output_path`.
///
/// Inputs that are not images are rejected up front; images that fail to
/// decode are skipped. An existing directory as `output_path` receives
/// `images-to-pdf.pdf`.
pub async fn images_to_pdf_file(
    inputs: &[impl AsRef<str>],
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, ToolboxError> {
    let mut files = Vec::with_capacity(inputs.len());
    for input_str in inputs {
        files.push(input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?);
    }

    let mut tool = images_to_pdf_tool(config.clone(), Arc::new(TracingNotifier));
    let selected = files.len();
    let accepted = tool.select_files(files).await;
    if accepted < selected {
        info!("{} of {} inputs were not images", selected - accepted, selected);
    }

    let artifact = tool.convert().await?;
    save_download(artifact, output_path).await?;
    Ok(artifact.stats().clone())
}

/// Rasterise a PDF (path or URL) and write the page archive to `output_path`.
///
/// An existing directory as `output_path` receives `pdf-to-images.zip`.
pub async fn pdf_to_images_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, ToolboxError> {
    let pdf = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    // Fail with the real reason instead of a generic empty-selection error.
    pdf.ensure_pdf()?;

    let mut tool = pdf_to_images_tool(config.clone(), Arc::new(TracingNotifier));
    if tool.select_files(vec![pdf]).await == 0 {
        return Err(ToolboxError::InvalidState(
            "the PDF could not be opened; see the log for details".to_string(),
        ));
    }

    let artifact = tool.convert().await?;
    save_download(artifact, output_path).await?;
    Ok(artifact.stats().clone())
}

/// Synchronous wrapper around [`pdf_to_images_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn pdf_to_images_file_sync(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, ToolboxError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ToolboxError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(pdf_to_images_file(input_str, output_path, config))
}
