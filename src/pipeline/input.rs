//! Input resolution: turn a user-supplied path or URL into a [`SourceFile`].
//!
//! Everything is read fully into memory; pdfium and the image decoders both
//! work from byte buffers, so no temp file is needed for downloads.

use crate::error::ToolboxError;
use crate::source::SourceFile;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Check if the input string is an HTTP(S) URL. The scheme is case-insensitive.
pub fn is_url(input: &str) -> bool {
    reqwest::Url::parse(input)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Resolve the input string to an in-memory source file.
///
/// URLs are downloaded with the given timeout; anything else is treated as a
/// local path.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<SourceFile, ToolboxError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

/// Read a local file, distinguishing missing files from unreadable ones.
pub async fn read_local(path: &Path) -> Result<SourceFile, ToolboxError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ToolboxError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ToolboxError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let file = SourceFile::from_bytes(name, bytes);
    debug!("Read {} ({} bytes, {})", path.display(), file.size(), file.mime());
    Ok(file)
}

/// Read several local files, preserving argument order.
pub async fn read_all(paths: &[PathBuf]) -> Result<Vec<SourceFile>, ToolboxError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_local(path).await?);
    }
    Ok(files)
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<SourceFile, ToolboxError> {
    info!("Downloading from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ToolboxError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_send_err = |e: reqwest::Error| {
        if e.is_timeout() {
            ToolboxError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ToolboxError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_send_err)?;

    if !response.status().is_success() {
        return Err(ToolboxError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_send_err)?;
    let file = SourceFile::from_bytes(filename_from_url(url), bytes.to_vec());
    info!("Downloaded {} bytes ({})", file.size(), file.mime());
    Ok(file)
}

/// Last path segment of the URL when it looks like a file name.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "download".to_string()
}
