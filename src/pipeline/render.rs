//! PDF rasterisation: render every page to PNG via pdfium.
//!
//! Each job opens its document against the shared pdfium binding and renders
//! all pages on one `spawn_blocking` thread, strictly in page order. Pages are rendered at [`RENDER_SCALE`]: one PDF
//! point becomes two pixels.

use crate::config::{ConversionConfig, RENDER_SCALE};
use crate::error::ToolboxError;
use crate::pipeline::encode::encode_png;
use crate::pipeline::engine::bind_pdfium;
use crate::progress::ProgressCallback;
use crate::source::SourceFile;
use pdfium_render::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// One rasterised page, PNG-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// 1-indexed page number.
    pub page_num: usize,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Count pages without rendering anything.
///
/// Used on selection so the caller can show how much work a conversion
/// will be; a parse failure here means the file is rejected.
pub async fn probe_page_count(
    pdf: &SourceFile,
    password: Option<&str>,
) -> Result<usize, ToolboxError> {
    pdf.ensure_pdf()?;
    let bytes = pdf.shared_bytes();
    let name = pdf.name().to_string();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium()?;
        let document = load_document(pdfium, &bytes, &name, pwd.as_deref())?;
        Ok::<usize, ToolboxError>(document.pages().len() as usize)
    })
    .await
    .map_err(|e| ToolboxError::Internal(format!("Probe task panicked: {}", e)))?
}

/// Rasterise every page of `pdf`, in order.
///
/// Any failure aborts the whole job: a broken PDF yields no pages rather
/// than a truncated set.
pub async fn rasterize_pages(
    pdf: &SourceFile,
    config: &ConversionConfig,
) -> Result<Vec<RenderedPage>, ToolboxError> {
    pdf.ensure_pdf()?;
    let bytes = pdf.shared_bytes();
    let name = pdf.name().to_string();
    let password = config.password.clone();
    let progress = config.progress_callback.clone();

    let mut pages = Vec::new();
    tokio::task::spawn_blocking(move || {
        render_pages_blocking(&bytes, &name, password.as_deref(), progress, |page| {
            pages.push(page);
            true
        })?;
        Ok::<Vec<RenderedPage>, ToolboxError>(pages)
    })
    .await
    .map_err(|e| ToolboxError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of page rendering.
///
/// `sink` receives each page as soon as it is encoded; returning `false`
/// stops rendering early (the streaming consumer went away).
pub(crate) fn render_pages_blocking(
    bytes: &Arc<[u8]>,
    name: &str,
    password: Option<&str>,
    progress: Option<ProgressCallback>,
    mut sink: impl FnMut(RenderedPage) -> bool,
) -> Result<usize, ToolboxError> {
    let pdfium = bind_pdfium()?;
    let document = load_document(pdfium, bytes, name, password)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);
    if let Some(ref cb) = progress {
        cb.on_conversion_start(total_pages);
    }

    let render_config = PdfRenderConfig::new().scale_page_by_factor(RENDER_SCALE);

    let mut rendered = 0;
    for idx in 0..total_pages {
        let page_num = idx + 1;
        if let Some(ref cb) = progress {
            cb.on_item_start(page_num, total_pages);
        }

        let page = pages
            .get(idx as u16)
            .map_err(|e| ToolboxError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            ToolboxError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        let png = encode_png(&image).map_err(|e| ToolboxError::EncodeFailed {
            page: page_num,
            detail: e.to_string(),
        })?;
        debug!(
            "Rendered page {} → {}x{} px, {} bytes PNG",
            page_num,
            image.width(),
            image.height(),
            png.len()
        );

        if let Some(ref cb) = progress {
            cb.on_item_complete(page_num, total_pages, png.len());
        }
        rendered += 1;

        let keep_going = sink(RenderedPage {
            page_num,
            width: image.width(),
            height: image.height(),
            png,
        });
        if !keep_going {
            debug!("Page consumer dropped after page {}", page_num);
            break;
        }
    }

    if let Some(ref cb) = progress {
        cb.on_conversion_complete(total_pages, rendered);
    }
    Ok(rendered)
}

/// Open a document from memory, mapping password failures to their own errors.
fn load_document<'a>(
    pdfium: &'a Pdfium,
    bytes: &[u8],
    name: &str,
    password: Option<&str>,
) -> Result<PdfDocument<'a>, ToolboxError> {
    pdfium
        .load_pdf_from_byte_vec(bytes.to_vec(), password)
        .map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    ToolboxError::WrongPassword {
                        name: name.to_string(),
                    }
                } else {
                    ToolboxError::PasswordRequired {
                        name: name.to_string(),
                    }
                }
            } else {
                ToolboxError::CorruptPdf {
                    name: name.to_string(),
                    detail: err_str,
                }
            }
        })
}
