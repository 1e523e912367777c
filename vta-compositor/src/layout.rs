//! Overlay placement on the render surface

use serde::{Deserialize, Serialize};
use vta_core::action::{OverlayPosition, OverlaySize};

/// Render surface dimensions supplied by the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stage {
    /// Stage width in pixels
    pub width: f64,
    /// Stage height in pixels
    pub height: f64,
    /// Progress bar width in pixels, for marker clustering
    pub progress_bar_width: f64,
}

impl Stage {
    pub fn new(width: f64, height: f64, progress_bar_width: f64) -> Self {
        Self {
            width,
            height,
            progress_bar_width,
        }
    }
}

/// Pixel box of an overlay, relative to the stage's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Treats zero and NaN as unset
fn truthy(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

fn percent_of(percent: f64, extent: f64) -> f64 {
    percent * extent / 100.0
}

/// Computes the overlay's pixel size.
///
/// A set width or height is taken as a stage percentage; the missing
/// dimension follows from the graphic's aspect ratio (`0` means unknown
/// and is treated as square).
pub fn overlay_size(size: Option<&OverlaySize>, aspect_ratio: f64, stage: &Stage) -> (f64, f64) {
    let ratio = if aspect_ratio > 0.0 && aspect_ratio.is_finite() {
        aspect_ratio
    } else {
        1.0
    };
    let width_pct = size.and_then(|s| truthy(s.width));
    let height_pct = size.and_then(|s| truthy(s.height));

    let from_width = width_pct.map(|w| percent_of(w, stage.width));
    let from_height = height_pct.map(|h| percent_of(h, stage.height));

    let width = truthy(from_width)
        .or_else(|| from_height.map(|h| h * ratio))
        .unwrap_or(0.0);
    let height = truthy(from_height)
        .or_else(|| from_width.map(|w| w / ratio))
        .unwrap_or(0.0);

    (width, height)
}

/// Computes the overlay's top-left corner.
///
/// Vertical anchors apply in order `top`, `bottom`, `vcenter`, the last
/// present one winning; horizontal anchors likewise with `left`, `right`,
/// `hcenter`. Center anchors are offsets from the middle and honor zero.
pub fn overlay_origin(
    position: Option<&OverlayPosition>,
    width: f64,
    height: f64,
    stage: &Stage,
) -> (f64, f64) {
    let Some(position) = position else {
        return (0.0, 0.0);
    };
    if stage.width == 0.0 || stage.height == 0.0 {
        return (0.0, 0.0);
    }

    let mut top = 0.0;
    if let Some(t) = truthy(position.top) {
        top = percent_of(t, stage.height);
    }
    if let Some(b) = truthy(position.bottom) {
        top = stage.height - percent_of(b, stage.height) - height;
    }
    if let Some(v) = position.vcenter {
        top = stage.height * 0.5 - height * 0.5 + percent_of(v, stage.height);
    }

    let mut left = 0.0;
    if let Some(l) = truthy(position.left) {
        left = percent_of(l, stage.width);
    }
    if let Some(r) = truthy(position.right) {
        left = stage.width - percent_of(r, stage.width) - width;
    }
    if let Some(h) = position.hcenter {
        left = stage.width * 0.5 - width * 0.5 + percent_of(h, stage.width);
    }

    (left, top)
}

/// Places an overlay on the stage
pub fn place(
    position: Option<&OverlayPosition>,
    size: Option<&OverlaySize>,
    aspect_ratio: f64,
    stage: &Stage,
) -> PixelRect {
    let (width, height) = overlay_size(size, aspect_ratio, stage);
    let (left, top) = overlay_origin(position, width, height, stage);
    PixelRect {
        left,
        top,
        width,
        height,
    }
}
