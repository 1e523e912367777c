//! Per-tick frame composition

use crate::layout::{self, PixelRect, Stage};
use crate::svg::{self, SvgStore, ViewBox};
use crate::visibility::{self, Animation, OverlayState};
use crate::Result;
use serde::Serialize;
use vta_core::markers::cluster_markers_with_margin;
use vta_core::{resolve_values, ActionLog, ClusteredMarker, EngineConfig, Marker, Playhead, ValueMap};

/// An overlay ready for the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedOverlay {
    pub key: String,
    /// Graphic with placeholders substituted; `None` when not preloaded
    pub markup: Option<String>,
    pub rect: PixelRect,
    pub animation: Animation,
}

/// Everything the player needs to draw annotations at one timestamp
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Frame {
    /// Variable and timer values by name
    pub values: ValueMap,
    /// Mounted overlays in render order
    pub overlays: Vec<RenderedOverlay>,
    /// Progress-bar markers
    pub markers: Vec<ClusteredMarker>,
}

/// Combines the resolvers into one evaluation per playback tick.
///
/// Holds configuration only; each call builds its output from scratch.
#[derive(Debug, Clone)]
pub struct Compositor {
    config: EngineConfig,
    viewbox: ViewBox,
}

impl Compositor {
    /// Creates a new compositor with the given configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self {
            config,
            viewbox: ViewBox::new()?,
        })
    }

    /// Evaluates the annotation state at the playhead
    pub fn compose(
        &self,
        log: &ActionLog,
        markers: &[Marker],
        playhead: Playhead,
        stage: &Stage,
        svgs: &SvgStore,
    ) -> Frame {
        if !playhead.is_ready() {
            return Frame::default();
        }
        let time = playhead.current_secs;

        let values = resolve_values(log, time);
        let overlays = visibility::resolve_overlays_with(log, time, &self.config)
            .into_values()
            .map(|state| self.render_overlay(state, &values, stage, svgs))
            .collect();
        let markers = cluster_markers_with_margin(
            markers,
            playhead.duration_secs,
            stage.progress_bar_width,
            self.config.marker_pixel_margin,
        );

        Frame {
            values,
            overlays,
            markers,
        }
    }

    fn render_overlay(
        &self,
        state: OverlayState,
        values: &ValueMap,
        stage: &Stage,
        svgs: &SvgStore,
    ) -> RenderedOverlay {
        let graphic = svgs.get(&state.key, state.svg_url.as_deref());
        let ratio = graphic.map_or(0.0, |g| self.viewbox.aspect_ratio(g));
        let markup = graphic.map(|g| svg::substitute(g, &state.variable_positions, values));
        let rect = layout::place(state.position.as_ref(), state.size.as_ref(), ratio, stage);

        RenderedOverlay {
            key: state.key,
            markup,
            rect,
            animation: state.animation,
        }
    }
}
