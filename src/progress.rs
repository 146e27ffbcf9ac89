//! Progress-callback trait for per-item conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline processes each image (Image→PDF) or page
//! (PDF→Images). Items are always reported in input order, since both
//! directions process strictly sequentially.
//!
//! The trait is `Send + Sync` because the pipeline invokes it from inside
//! `spawn_blocking` threads.
//!
//! # Example
//!
//! ```rust
//! use toolbox_pdf::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_item_complete(&self, item: usize, total: usize, bytes: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{item}/{total} done ({bytes} bytes)");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Observer for conversion progress.
///
/// All methods have no-op defaults; implement only what you need.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first item is processed.
    ///
    /// # Arguments
    /// * `total` — number of images or pages that will be processed
    fn on_conversion_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before an item is decoded or rendered.
    ///
    /// # Arguments
    /// * `item`  — 1-indexed position (image position or page number)
    /// * `total` — total items in the job
    fn on_item_start(&self, item: usize, total: usize) {
        let _ = (item, total);
    }

    /// Called when an item has been placed or rendered.
    ///
    /// # Arguments
    /// * `item`  — 1-indexed position
    /// * `total` — total items
    /// * `bytes` — encoded size of the item's output (PNG bytes for pages,
    ///   source bytes for images)
    fn on_item_complete(&self, item: usize, total: usize, bytes: usize) {
        let _ = (item, total, bytes);
    }

    /// Called when an image is skipped because it could not be decoded.
    ///
    /// Only Image→PDF jobs skip; PDF→Images aborts instead.
    fn on_item_skipped(&self, item: usize, total: usize, reason: &str) {
        let _ = (item, total, reason);
    }

    /// Called once after every item has been attempted.
    ///
    /// # Arguments
    /// * `total`     — items in the job
    /// * `succeeded` — items that produced output
    fn on_conversion_complete(&self, total: usize, succeeded: usize) {
        let _ = (total, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
