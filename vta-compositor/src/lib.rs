//! VTA Compositor Library
//!
//! This library resolves which overlays are mounted at a playback timestamp
//! and turns them, together with variable/timer values and progress-bar
//! markers, into a frame the rendering layer can draw.

pub mod compositor;
pub mod layout;
pub mod svg;
pub mod visibility;

pub use compositor::{Compositor, Frame, RenderedOverlay};
pub use layout::{PixelRect, Stage};
pub use svg::SvgStore;
pub use visibility::{resolve_overlays, resolve_overlays_with, Animation, OverlayState};

/// Result type for vta-compositor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for vta-compositor operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}
