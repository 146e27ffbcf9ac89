//! ZIP packaging of rendered pages as `page-{n}.png`.

use crate::config::ArchiveCompression;
use crate::error::ToolboxError;
use crate::pipeline::render::RenderedPage;
use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::FileOptions;

/// Archive entry name for a 1-indexed page.
pub fn page_entry_name(page_num: usize) -> String {
    format!("page-{page_num}.png")
}

/// Bundle `pages` into an in-memory ZIP, one entry per page, in slice order.
pub fn package_pages(
    pages: &[RenderedPage],
    compression: ArchiveCompression,
) -> Result<Vec<u8>, ToolboxError> {
    let archive_err = |e: &dyn std::fmt::Display| ToolboxError::ArchiveFailed {
        detail: e.to_string(),
    };

    let method = match compression {
        ArchiveCompression::Stored => zip::CompressionMethod::Stored,
        ArchiveCompression::Deflated => zip::CompressionMethod::Deflated,
    };
    let options = FileOptions::default().compression_method(method);

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for page in pages {
        let name = page_entry_name(page.page_num);
        zip.start_file(name.as_str(), options)
            .map_err(|e| archive_err(&e))?;
        zip.write_all(&page.png).map_err(|e| archive_err(&e))?;
        debug!("Archived {} ({} bytes)", name, page.png.len());
    }

    let cursor = zip.finish().map_err(|e| archive_err(&e))?;
    Ok(cursor.into_inner())
}

/// Run [`package_pages`] on the blocking pool.
pub async fn package_pages_async(
    pages: Vec<RenderedPage>,
    compression: ArchiveCompression,
) -> Result<(Vec<RenderedPage>, Vec<u8>), ToolboxError> {
    tokio::task::spawn_blocking(move || {
        let zip = package_pages(&pages, compression)?;
        Ok::<_, ToolboxError>((pages, zip))
    })
    .await
    .map_err(|e| ToolboxError::Internal(format!("Packaging task panicked: {}", e)))?
}
