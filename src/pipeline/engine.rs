//! Binding to the pdfium shared library.
//!
//! Lookup order, first match wins:
//!
//! 1. `PDFIUM_LIB_PATH` — explicit path to the library file or its directory
//! 2. the current working directory
//! 3. `./lib`
//! 4. the directory holding the running executable
//! 5. the system library search path
//!
//! pdfium's library state is process-global: creating a [`Pdfium`] initialises
//! it and dropping one destroys it. The binding is therefore made once and
//! shared by every job for the life of the process. A failed lookup is not
//! cached, so a later call may still succeed.

use crate::error::ToolboxError;
use once_cell::sync::OnceCell;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an existing pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

/// The process-wide pdfium instance, bound on first use.
///
/// Concurrent first calls block until one binding attempt finishes, so the
/// library is never initialised twice.
pub fn bind_pdfium() -> Result<&'static Pdfium, ToolboxError> {
    PDFIUM.get_or_try_init(|| {
        let pdfium = bind_library()?;
        info!("pdfium bound for this process");
        Ok(pdfium)
    })
}

/// Whether pdfium has been bound in this process.
pub fn is_bound() -> bool {
    PDFIUM.get().is_some()
}

/// Try each candidate path, then the system library.
fn bind_library() -> Result<Pdfium, ToolboxError> {
    let mut last_error = String::from("no candidate library found");

    for candidate in candidate_paths() {
        match Pdfium::bind_to_library(&candidate) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", candidate.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => last_error = format!("{}: {:?}", candidate.display(), e),
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| ToolboxError::PdfiumBindingFailed(format!("{last_error}; system: {e:?}")))
}

/// Library file paths to try before the system search path.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(explicit) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !explicit.is_empty() {
            paths.push(library_at(Path::new(&explicit)));
        }
    }

    paths.push(Pdfium::pdfium_platform_library_name_at_path("./"));
    paths.push(Pdfium::pdfium_platform_library_name_at_path("./lib"));

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(Pdfium::pdfium_platform_library_name_at_path(&exe_dir));
    }

    paths
}

/// Accept either a directory or the library file itself.
fn library_at(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}
