//! Playback position supplied by the host player

use serde::{Deserialize, Serialize};

/// Playback timestamp at which derived state is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Playhead {
    /// Current playback time in seconds (the cutoff `T`)
    pub current_secs: f64,
    /// Total media duration in seconds; zero until metadata loads
    pub duration_secs: f64,
}

impl Playhead {
    /// Creates a new playhead
    pub fn new(current_secs: f64, duration_secs: f64) -> Self {
        Self {
            current_secs,
            duration_secs,
        }
    }

    /// Whether the host has supplied enough to evaluate anything
    pub fn is_ready(&self) -> bool {
        self.duration_secs.is_finite()
            && self.duration_secs > 0.0
            && self.current_secs.is_finite()
            && self.current_secs >= 0.0
    }
}

/// `offset / 1000 <= time_secs`
pub(crate) fn reached(offset_ms: u64, time_secs: f64) -> bool {
    offset_ms as f64 / 1000.0 <= time_secs
}
