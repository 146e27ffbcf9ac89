//! In-memory input files and per-tool accept lists.
//!
//! A [`SourceFile`] is whatever the user picked: a display name, the raw
//! bytes, and a MIME type sniffed from the content. Bytes are shared behind
//! an `Arc` so the same file can back a preview handle and be moved into a
//! blocking decode task without copying.

use crate::error::ToolboxError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// MIME type of PDF documents.
pub const PDF_MIME: &str = "application/pdf";

/// Fallback MIME type for unrecognised content.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A user-supplied binary held in memory for the session.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    bytes: Arc<[u8]>,
    mime: String,
}

impl SourceFile {
    /// Wrap `bytes`, sniffing the MIME type from content then extension.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let bytes = bytes.into();
        let mime = sniff_mime(&bytes, &name);
        Self { name, bytes, mime }
    }

    /// Wrap `bytes` with a caller-declared MIME type.
    pub fn with_mime(
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
        mime: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            mime: mime.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the bytes, for moving into blocking tasks.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_pdf(&self) -> bool {
        self.mime == PDF_MIME
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    /// Fail with [`ToolboxError::NotAPdf`] unless the bytes carry the `%PDF` signature.
    pub fn ensure_pdf(&self) -> Result<(), ToolboxError> {
        if self.bytes.starts_with(b"%PDF") {
            Ok(())
        } else {
            Err(ToolboxError::NotAPdf {
                name: self.name.clone(),
                magic: self.bytes.iter().take(4).copied().collect(),
            })
        }
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Determine a MIME type from magic bytes, falling back to the file extension.
pub fn sniff_mime(bytes: &[u8], name: &str) -> String {
    if bytes.starts_with(b"%PDF") {
        return PDF_MIME.to_string();
    }
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }

    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => PDF_MIME.to_string(),
        Some(ext) => image::ImageFormat::from_extension(ext)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|| OCTET_STREAM.to_string()),
        None => OCTET_STREAM.to_string(),
    }
}

/// One rule of an [`AcceptList`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum AcceptRule {
    /// `image/*` — any MIME with this top-level type.
    MimePrefix(String),
    /// `image/jpeg` — exact MIME.
    Mime(String),
    /// `.pdf` — file-name extension, case-insensitive.
    Extension(String),
}

/// File-picker style allow-list, e.g. `"image/*"` or `".pdf,application/pdf"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptList {
    rules: Vec<AcceptRule>,
    source: String,
}

impl AcceptList {
    /// Parse a comma-separated accept string. Empty entries are ignored.
    pub fn parse(spec: &str) -> Self {
        let rules = spec
            .split(',')
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .map(|s| {
                if let Some(ext) = s.strip_prefix('.') {
                    AcceptRule::Extension(ext.to_string())
                } else if let Some(prefix) = s.strip_suffix("/*") {
                    AcceptRule::MimePrefix(format!("{prefix}/"))
                } else {
                    AcceptRule::Mime(s)
                }
            })
            .collect();
        Self {
            rules,
            source: spec.trim().to_string(),
        }
    }

    pub fn images() -> Self {
        Self::parse("image/*")
    }

    pub fn pdf() -> Self {
        Self::parse(".pdf,application/pdf")
    }

    pub fn matches(&self, file: &SourceFile) -> bool {
        let mime = file.mime().to_ascii_lowercase();
        let ext = Path::new(file.name())
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        self.rules.iter().any(|rule| match rule {
            AcceptRule::MimePrefix(prefix) => mime.starts_with(prefix.as_str()),
            AcceptRule::Mime(m) => mime == *m,
            AcceptRule::Extension(e) => ext.as_deref() == Some(e.as_str()),
        })
    }

    /// Accept `file` or explain why not.
    pub fn check(&self, file: &SourceFile) -> Result<(), ToolboxError> {
        if self.matches(file) {
            Ok(())
        } else {
            Err(ToolboxError::UnsupportedFileType {
                name: file.name().to_string(),
                mime: file.mime().to_string(),
                expected: self.source.clone(),
            })
        }
    }

    /// The accept string this list was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}
