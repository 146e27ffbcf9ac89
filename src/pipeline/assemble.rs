//! Image→PDF assembly: one page per image, in input order.
//!
//! Images are decoded one at a time on the blocking pool. A decode failure
//! skips that image and the job carries on; only when nothing decodes does
//! the job fail. Page creation then runs in a single blocking task, because a
//! pdfium document must not have pages appended from more than one thread.

use crate::config::ConversionConfig;
use crate::error::{SkippedImage, ToolboxError};
use crate::pipeline::engine::bind_pdfium;
use crate::pipeline::layout::PageLayout;
use crate::source::SourceFile;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

/// A finished Image→PDF document, not yet registered as a handle.
#[derive(Debug, Clone)]
pub struct AssembledPdf {
    /// Serialised PDF.
    pub bytes: Vec<u8>,
    /// Pages written; equals the number of images that decoded.
    pub page_count: usize,
    /// Images that could not be decoded, in input order.
    pub skipped: Vec<SkippedImage>,
}

/// Decode `file` on the blocking pool.
pub async fn decode_image(file: &SourceFile) -> Result<DynamicImage, String> {
    let bytes = file.shared_bytes();
    let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| format!("decode task panicked: {e}"))?;

    let img = decoded.map_err(|e| e.to_string())?;
    if img.width() == 0 || img.height() == 0 {
        return Err("image has zero width or height".to_string());
    }
    Ok(img)
}

/// Build one PDF from `images`, one page each, in order.
///
/// # Errors
/// * [`ToolboxError::EmptySelection`] when `images` is empty
/// * [`ToolboxError::AllImagesFailed`] when no image decodes
/// * [`ToolboxError::PdfAssemblyFailed`] / [`ToolboxError::PdfiumBindingFailed`]
///   for pdfium failures
pub async fn assemble_pdf(
    images: &[SourceFile],
    config: &ConversionConfig,
) -> Result<AssembledPdf, ToolboxError> {
    if images.is_empty() {
        return Err(ToolboxError::EmptySelection {
            hint: "Please upload at least one image".to_string(),
        });
    }

    let total = images.len();
    info!("Assembling PDF from {} images", total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    // ── Decode sequentially, skipping failures ───────────────────────────
    let mut decoded = Vec::with_capacity(total);
    let mut skipped = Vec::new();
    for (idx, file) in images.iter().enumerate() {
        let position = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_item_start(position, total);
        }
        match decode_image(file).await {
            Ok(img) => {
                debug!(
                    "Decoded image {} '{}' → {}x{}",
                    position,
                    file.name(),
                    img.width(),
                    img.height()
                );
                decoded.push((position, file.size(), img));
            }
            Err(detail) => {
                warn!("Skipping image {} '{}': {}", position, file.name(), detail);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_item_skipped(position, total, &detail);
                }
                skipped.push(SkippedImage {
                    position,
                    name: file.name().to_string(),
                    detail,
                });
            }
        }
    }

    if decoded.is_empty() {
        let first_error = skipped
            .first()
            .map(|s| s.detail.clone())
            .unwrap_or_else(|| "Unknown error".to_string());
        if let Some(ref cb) = config.progress_callback {
            cb.on_conversion_complete(total, 0);
        }
        return Err(ToolboxError::AllImagesFailed { total, first_error });
    }

    // ── Place pages on one thread ─────────────────────────────────────────
    let layout = PageLayout::from_config(config);
    let progress = config.progress_callback.clone();
    let placed = decoded.len();

    let bytes = tokio::task::spawn_blocking(move || {
        write_pages_blocking(&layout, decoded, |position, size| {
            if let Some(ref cb) = progress {
                cb.on_item_complete(position, total, size);
            }
        })
    })
    .await
    .map_err(|e| ToolboxError::Internal(format!("Assembly task panicked: {}", e)))??;

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total, placed);
    }
    info!(
        "PDF assembled: {} pages, {} skipped, {} bytes",
        placed,
        skipped.len(),
        bytes.len()
    );

    Ok(AssembledPdf {
        bytes,
        page_count: placed,
        skipped,
    })
}

/// Blocking implementation of page placement.
fn write_pages_blocking(
    layout: &PageLayout,
    images: Vec<(usize, usize, DynamicImage)>,
    mut on_placed: impl FnMut(usize, usize),
) -> Result<Vec<u8>, ToolboxError> {
    let pdfium = bind_pdfium()?;
    let assembly_err = |e: PdfiumError| ToolboxError::PdfAssemblyFailed {
        detail: format!("{:?}", e),
    };

    let mut document = pdfium.create_new_pdf().map_err(assembly_err)?;

    for (position, size, img) in images {
        // Decoding already rejected zero-sized images.
        let Some(p) = layout.place(img.width(), img.height()) else {
            continue;
        };

        let paper = PdfPagePaperSize::from_points(
            PdfPoints::new(layout.page_width),
            PdfPoints::new(layout.page_height),
        );
        let mut page = document
            .pages_mut()
            .create_page_at_end(paper)
            .map_err(assembly_err)?;

        page.objects_mut()
            .create_image_object(
                PdfPoints::new(p.x),
                PdfPoints::new(p.y),
                &img,
                Some(PdfPoints::new(p.width)),
                Some(PdfPoints::new(p.height)),
            )
            .map_err(assembly_err)?;

        debug!(
            "Placed image {} at ({:.1}, {:.1}) size {:.1}x{:.1} pt",
            position, p.x, p.y, p.width, p.height
        );
        on_placed(position, size);
    }

    document.save_to_bytes().map_err(assembly_err)
}
