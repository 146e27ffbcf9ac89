//! Conversion results and their downloads.
//!
//! An artifact owns the [`PreviewHandle`]s of everything it produced.
//! Dropping the artifact revokes them all, which is how a new conversion (or
//! a change of inputs) invalidates the previous result.

use crate::config::{PDF_DOWNLOAD_NAME, ZIP_DOWNLOAD_NAME};
use crate::error::{SkippedImage, ToolboxError};
use crate::handles::{Blob, HandleRegistry, PreviewHandle};
use crate::pipeline::assemble::AssembledPdf;
use crate::pipeline::encode::data_uri;
use crate::pipeline::package::page_entry_name;
use crate::pipeline::render::RenderedPage;
use crate::source::PDF_MIME;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// MIME type of the page archive.
pub const ZIP_MIME: &str = "application/zip";

/// Summary of a finished conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Images selected, or pages in the PDF.
    pub input_count: usize,
    /// Pages written (Image→PDF) or images rendered (PDF→Images).
    pub output_count: usize,
    /// Images skipped because they could not be decoded.
    pub skipped_count: usize,
    /// Size of the downloadable artifact.
    pub output_bytes: usize,
    pub duration_ms: u64,
}

/// Common surface of conversion results.
pub trait Artifact: Send + Sync {
    /// Fixed file name offered for download.
    fn download_name(&self) -> &str;

    /// The handle whose blob is downloaded.
    fn download(&self) -> &PreviewHandle;

    /// URLs of every handle this artifact owns.
    fn handle_urls(&self) -> Vec<&str>;

    fn stats(&self) -> &ConversionStats;
}

/// Result of Image→PDF.
#[derive(Debug)]
pub struct PdfArtifact {
    pub document: PreviewHandle,
    pub page_count: usize,
    pub skipped: Vec<SkippedImage>,
    pub stats: ConversionStats,
}

impl PdfArtifact {
    /// Register the assembled document as a handle.
    pub fn publish(pdf: AssembledPdf, registry: &HandleRegistry, input_count: usize, duration_ms: u64) -> Self {
        let stats = ConversionStats {
            input_count,
            output_count: pdf.page_count,
            skipped_count: pdf.skipped.len(),
            output_bytes: pdf.bytes.len(),
            duration_ms,
        };
        Self {
            document: registry.create(Blob::new(pdf.bytes, PDF_MIME)),
            page_count: pdf.page_count,
            skipped: pdf.skipped,
            stats,
        }
    }

    /// The document as `data:application/pdf;base64,...`.
    pub fn data_uri(&self) -> String {
        data_uri(self.document.mime(), self.document.bytes())
    }
}

impl Artifact for PdfArtifact {
    fn download_name(&self) -> &str {
        PDF_DOWNLOAD_NAME
    }

    fn download(&self) -> &PreviewHandle {
        &self.document
    }

    fn handle_urls(&self) -> Vec<&str> {
        vec![self.document.url()]
    }

    fn stats(&self) -> &ConversionStats {
        &self.stats
    }
}

/// One page preview of a PDF→Images result.
#[derive(Debug)]
pub struct PagePreview {
    pub page_num: usize,
    pub width: u32,
    pub height: u32,
    pub handle: PreviewHandle,
}

/// Result of PDF→Images: ordered previews plus one archive.
#[derive(Debug)]
pub struct ImageSetArtifact {
    pub pages: Vec<PagePreview>,
    pub archive: PreviewHandle,
    pub stats: ConversionStats,
}

impl ImageSetArtifact {
    /// Register each page and the archive as handles, preserving page order.
    pub fn publish(
        pages: Vec<RenderedPage>,
        archive: Vec<u8>,
        registry: &HandleRegistry,
        duration_ms: u64,
    ) -> Self {
        let stats = ConversionStats {
            input_count: pages.len(),
            output_count: pages.len(),
            skipped_count: 0,
            output_bytes: archive.len(),
            duration_ms,
        };
        let pages = pages
            .into_iter()
            .map(|p| PagePreview {
                page_num: p.page_num,
                width: p.width,
                height: p.height,
                handle: registry.create(Blob::new(p.png, "image/png")),
            })
            .collect();
        Self {
            pages,
            archive: registry.create(Blob::new(archive, ZIP_MIME)),
            stats,
        }
    }

    /// Preview URLs in page order.
    pub fn preview_urls(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.handle.url()).collect()
    }

    /// Write every page as `dir/page-{n}.png`.
    pub async fn save_previews(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ToolboxError> {
        let dir = dir.as_ref();
        let mut written = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let path = dir.join(page_entry_name(page.page_num));
            write_atomic(&path, page.handle.bytes()).await?;
            written.push(path);
        }
        info!("Wrote {} page previews to {}", written.len(), dir.display());
        Ok(written)
    }
}

impl Artifact for ImageSetArtifact {
    fn download_name(&self) -> &str {
        ZIP_DOWNLOAD_NAME
    }

    fn download(&self) -> &PreviewHandle {
        &self.archive
    }

    fn handle_urls(&self) -> Vec<&str> {
        let mut urls = self.preview_urls();
        urls.push(self.archive.url());
        urls
    }

    fn stats(&self) -> &ConversionStats {
        &self.stats
    }
}

/// Save an artifact's download.
///
/// An existing directory receives the artifact's fixed download name;
/// any other path is used as the file name itself.
pub async fn save_download(artifact: &impl Artifact, dest: impl AsRef<Path>) -> Result<PathBuf, ToolboxError> {
    let dest = dest.as_ref();
    let path = if dest.is_dir() {
        dest.join(artifact.download_name())
    } else {
        dest.to_path_buf()
    };
    write_atomic(&path, artifact.download().bytes()).await?;
    info!(
        "Saved {} ({} bytes)",
        path.display(),
        artifact.download().len()
    );
    Ok(path)
}

/// Write `bytes` via a sibling temp file and rename, so readers never see a
/// partial file.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ToolboxError> {
    let target = path.to_path_buf();
    let data = bytes.to_vec();

    tokio::task::spawn_blocking(move || {
        let write_err = |source: std::io::Error| ToolboxError::OutputWriteFailed {
            path: target.clone(),
            source,
        };

        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
        tmp.write_all(&data).map_err(write_err)?;
        tmp.persist(&target).map_err(|e| write_err(e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| ToolboxError::Internal(format!("Write task panicked: {}", e)))?
}
