//! Page geometry for Image→PDF: fit an image into the printable area and
//! centre it.
//!
//! Pure arithmetic in PDF points, kept apart from pdfium so it can be tested
//! without the library. Image pixels are treated as points before scaling.

use crate::config::ConversionConfig;

/// A page of fixed size with a uniform margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
}

/// Where and how large an image is drawn on its page.
///
/// `x`/`y` are the lower-left corner in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl PageLayout {
    pub fn new(page_width: f32, page_height: f32, margin: f32) -> Self {
        Self {
            page_width,
            page_height,
            margin,
        }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        let (w, h) = config.page_size.dimensions();
        Self::new(w, h, config.margin_pts)
    }

    /// Width and height available inside the margins.
    pub fn printable_area(&self) -> (f32, f32) {
        (
            (self.page_width - 2.0 * self.margin).max(0.0),
            (self.page_height - 2.0 * self.margin).max(0.0),
        )
    }

    /// Scale `img_w × img_h` uniformly so the limiting side fills the
    /// printable area, then centre it on the page.
    ///
    /// Returns `None` for zero-sized images.
    pub fn place(&self, img_w: u32, img_h: u32) -> Option<Placement> {
        if img_w == 0 || img_h == 0 {
            return None;
        }
        let (avail_w, avail_h) = self.printable_area();
        let (w, h) = (img_w as f32, img_h as f32);

        let scale = (avail_w / w).min(avail_h / h);
        let width = w * scale;
        let height = h * scale;

        Some(Placement {
            x: (self.page_width - width) / 2.0,
            y: (self.page_height - height) / 2.0,
            width,
            height,
            scale,
        })
    }
}
