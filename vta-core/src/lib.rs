//! VTA Core Library
//!
//! This library provides the action log data model and the pure resolvers
//! that fold it into derived state for a playback timestamp: variables,
//! timers and progress-bar markers. Overlay visibility lives in
//! `vta-compositor`, which builds on the types exported here.

pub mod action;
pub mod format;
pub mod markers;
pub mod priority;
pub mod timeline;
pub mod timers;
pub mod variables;

pub use action::{Action, ActionKind, ActionLog};
pub use markers::{cluster_markers, ClusteredMarker, Marker};
pub use priority::{compare_actions, priority};
pub use timeline::Playhead;
pub use timers::resolve_timers;
pub use variables::resolve_variables;

use std::collections::BTreeMap;

/// Name → formatted display value, as produced by the variable and timer resolvers
pub type ValueMap = BTreeMap<String, String>;

/// Grace window keeping an overlay alive long enough to finish an exit animation
pub const DISPOSE_TIMEOUT_SECS: f64 = 2.0;

/// Minimum horizontal distance between two rendered markers
pub const MARKER_PIXEL_MARGIN: f64 = 44.0;

/// Result type for vta-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for vta-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid action {id}: {reason}")]
    InvalidAction { id: String, reason: String },
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Seconds an overlay stays mounted after its visible window ends
    pub dispose_timeout_secs: f64,
    /// Marker clustering bucket width in pixels
    pub marker_pixel_margin: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dispose_timeout_secs: DISPOSE_TIMEOUT_SECS,
            marker_pixel_margin: MARKER_PIXEL_MARGIN,
        }
    }
}

/// Resolves variables and timers at `time_secs` into one mapping.
///
/// Timer values win over variables sharing a name.
pub fn resolve_values(log: &ActionLog, time_secs: f64) -> ValueMap {
    let mut values = resolve_variables(log, time_secs);
    values.extend(resolve_timers(log, time_secs));
    values
}
