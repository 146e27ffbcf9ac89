//! Streaming PDF→Images: yield pages as they finish rendering.
//!
//! Unlike [`crate::pipeline::render::rasterize_pages`], which returns only
//! after the last page, [`rasterize_stream`] hands each page to the caller
//! as soon as it is PNG-encoded. Pages still render one at a time on a
//! single blocking thread, so they always arrive in page order.
//!
//! Dropping the stream stops rendering after the page in flight.

use crate::config::ConversionConfig;
use crate::error::ToolboxError;
use crate::pipeline::input;
use crate::pipeline::render::{render_pages_blocking, RenderedPage};
use crate::source::SourceFile;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of rendered pages.
///
/// A fatal error is delivered as the final item.
pub type PageStream = Pin<Box<dyn Stream<Item = Result<RenderedPage, ToolboxError>> + Send>>;

/// Pages buffered between the renderer and a slow consumer.
const CHANNEL_DEPTH: usize = 2;

/// Rasterise `pdf`, streaming pages in order.
///
/// Input validation happens up front and is returned as `Err`; render
/// failures arrive on the stream. Must be called from within a Tokio runtime.
pub fn rasterize_stream(
    pdf: &SourceFile,
    config: &ConversionConfig,
) -> Result<PageStream, ToolboxError> {
    pdf.ensure_pdf()?;
    info!("Starting streaming rasterisation: {}", pdf.name());

    let bytes = pdf.shared_bytes();
    let name = pdf.name().to_string();
    let password = config.password.clone();
    let progress = config.progress_callback.clone();
    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);

    tokio::task::spawn_blocking(move || {
        let result = render_pages_blocking(&bytes, &name, password.as_deref(), progress, |page| {
            tx.blocking_send(Ok(page)).is_ok()
        });
        if let Err(e) = result {
            warn!("Streaming rasterisation of '{}' failed: {}", name, e);
            let _ = tx.blocking_send(Err(e));
        }
    });

    Ok(Box::pin(ReceiverStream::new(rx)))
}

/// Resolve a path or URL, then stream its pages.
pub async fn rasterize_stream_from(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<PageStream, ToolboxError> {
    let pdf = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    rasterize_stream(&pdf, config)
}
