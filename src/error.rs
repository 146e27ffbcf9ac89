//! Error types for the toolbox-pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ToolboxError`] — **Fatal** for the current job: the input was rejected
//!   before processing (wrong type, empty selection) or the conversion could
//!   not complete (corrupt PDF, render failure, archive failure). Returned as
//!   `Err(ToolboxError)` from every pipeline entry point.
//!
//! * [`SkippedImage`] — **Non-fatal**: a single image could not be decoded
//!   while assembling a PDF. The job continues with the remaining images and
//!   the skip is recorded on [`crate::output::PdfArtifact`].
//!
//! Nothing here is fatal to the process itself; every failure is scoped to a
//! single tool instance.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the toolbox-pdf library.
#[derive(Debug, Error)]
pub enum ToolboxError {
    // ── Input validation ─────────────────────────────────────────────────
    /// Conversion was requested with nothing selected.
    #[error("{hint}")]
    EmptySelection { hint: String },

    /// The file's type is not on the tool's accept list.
    #[error("'{name}' is not a supported file type ({mime}); expected {expected}")]
    UnsupportedFileType {
        name: String,
        mime: String,
        expected: String,
    },

    /// The tool accepts a single input and more than one was supplied.
    #[error("Only {max} file(s) can be converted at once, got {got}")]
    TooManyFiles { max: usize, got: usize },

    /// The bytes do not start with the `%PDF` signature.
    #[error("'{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: Vec<u8> },

    // ── Input I/O ─────────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' is corrupt: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// pdfium returned an error while rendering a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// pdfium returned an error while building the output document.
    #[error("Failed to assemble PDF: {detail}")]
    PdfAssemblyFailed { detail: String },

    /// Every image in the selection failed to decode.
    #[error("None of the {total} selected images could be loaded.\nFirst error: {first_error}")]
    AllImagesFailed { total: usize, first_error: String },

    // ── Encoding / packaging ──────────────────────────────────────────────
    /// A rendered page could not be PNG-encoded.
    #[error("Failed to encode page {page} as PNG: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// The ZIP archive could not be written.
    #[error("Failed to build archive: {detail}")]
    ArchiveFailed { detail: String },

    // ── Output I/O ────────────────────────────────────────────────────────
    /// Could not create or write a downloaded artifact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config / state ────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested action is not valid in the tool's current state.
    #[error("Invalid action: {0}")]
    InvalidState(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the binary or in ./lib.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolboxError {
    /// `true` when the error was raised by input validation, before any
    /// processing started.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ToolboxError::EmptySelection { .. }
                | ToolboxError::UnsupportedFileType { .. }
                | ToolboxError::TooManyFiles { .. }
                | ToolboxError::NotAPdf { .. }
        )
    }
}

/// A non-fatal failure for one image of an Image→PDF job.
///
/// Recorded on [`crate::output::PdfArtifact::skipped`]; the remaining
/// images are still placed.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[error("Image {position} ('{name}') skipped: {detail}")]
pub struct SkippedImage {
    /// 1-indexed position in the input selection.
    pub position: usize,
    /// Display name of the source file.
    pub name: String,
    /// Decoder error text.
    pub detail: String,
}
