//! Pipeline stages for image⇄PDF conversion.
//!
//! Each submodule implements one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! Image → PDF:  input ──▶ assemble (decode ─▶ layout ─▶ pdfium pages)
//! PDF → Image:  input ──▶ render (pdfium @ 2× ─▶ encode PNG) ──▶ package (ZIP)
//! ```
//!
//! 1. [`input`]    — read a local path or download a URL into a `SourceFile`
//! 2. [`engine`]   — bind the pdfium shared library
//! 3. [`layout`]   — fit-and-centre arithmetic for image pages
//! 4. [`assemble`] — decode images, skip failures, append pages in order
//! 5. [`render`]   — probe page counts and rasterise pages in order
//! 6. [`encode`]   — PNG and data-URI encoding
//! 7. [`package`]  — ZIP the rendered pages as `page-{n}.png`

pub mod assemble;
pub mod encode;
pub mod engine;
pub mod input;
pub mod layout;
pub mod package;
pub mod render;
