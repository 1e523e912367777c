//! Overlay visibility resolution
//!
//! Folds `show_overlay` / `hide_overlay` actions up to the cutoff into the
//! set of overlays that should currently be mounted, each carrying the
//! animation the renderer should play for it.

use indexmap::IndexMap;
use serde::Serialize;
use vta_core::action::{
    ActionKind, AnimateIn, AnimateOut, HideOverlay, OverlayPosition, OverlaySize, ShowOverlay,
};
use vta_core::{Action, ActionLog, EngineConfig};

/// Animation the renderer should apply to an overlay right now
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Animation {
    /// Render settled, no transition
    #[default]
    None,
    /// Enter transition; `duration_ms` is dropped once the enter window has passed
    Show {
        kind: AnimateIn,
        duration_ms: Option<f64>,
    },
    /// Exit transition, the overlay is leaving
    Hide {
        kind: AnimateOut,
        duration_ms: Option<f64>,
    },
}

impl Animation {
    fn enter(kind: Option<AnimateIn>, duration_ms: Option<f64>) -> Self {
        match (kind, duration_ms) {
            (None | Some(AnimateIn::None), None) => Animation::None,
            (kind, duration_ms) => Animation::Show {
                kind: kind.unwrap_or_default(),
                duration_ms,
            },
        }
    }

    fn exit(kind: Option<AnimateOut>, duration_ms: Option<f64>) -> Self {
        Animation::Hide {
            kind: kind.unwrap_or_default(),
            duration_ms,
        }
    }

    pub fn is_leaving(&self) -> bool {
        matches!(self, Animation::Hide { .. })
    }
}

/// An overlay that should be mounted at the evaluated time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayState {
    /// Identity key: `custom_id`, else the showing action's id
    pub key: String,
    pub custom_id: Option<String>,
    pub svg_url: Option<String>,
    pub position: Option<OverlayPosition>,
    pub size: Option<OverlaySize>,
    pub variable_positions: Vec<String>,
    pub animation: Animation,
}

/// Overlay identity: a non-empty `custom_id`, otherwise the action id
fn identity(custom_id: Option<&str>, action: &Action) -> String {
    match custom_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => action.id.clone(),
    }
}

/// Positive millisecond duration in seconds
fn positive_secs(duration_ms: Option<f64>) -> Option<f64> {
    duration_ms.filter(|d| *d > 0.0).map(|d| d / 1000.0)
}

/// Resolves the overlays visible at `time_secs` with the default configuration
pub fn resolve_overlays(log: &ActionLog, time_secs: f64) -> IndexMap<String, OverlayState> {
    resolve_overlays_with(log, time_secs, &EngineConfig::default())
}

/// Resolves the overlays visible at `time_secs`.
///
/// The map keeps first-show order; a later show for a mounted key replaces
/// its entry in place.
pub fn resolve_overlays_with(
    log: &ActionLog,
    time_secs: f64,
    config: &EngineConfig,
) -> IndexMap<String, OverlayState> {
    let dispose = config.dispose_timeout_secs;
    let mut overlays: IndexMap<String, OverlayState> = IndexMap::new();

    for action in log
        .ordered()
        .into_iter()
        .take_while(|a| a.offset_secs() <= time_secs)
    {
        match &action.kind {
            ActionKind::ShowOverlay(show) => {
                if let Some(state) = show_state(action, show, time_secs, dispose) {
                    overlays.insert(state.key.clone(), state);
                }
            }
            ActionKind::HideOverlay(hide) => {
                apply_hide(&mut overlays, action, hide, time_secs, dispose);
            }
            _ => {}
        }
    }

    overlays
}

fn show_state(action: &Action, show: &ShowOverlay, time_secs: f64, dispose: f64) -> Option<OverlayState> {
    let offset = action.offset_secs();
    let visible_for = positive_secs(show.duration);

    if let Some(visible_for) = visible_for {
        if offset + visible_for + dispose < time_secs {
            return None;
        }
    }

    let enter_duration = if offset + dispose <= time_secs {
        // Seeking past the enter window shows the overlay already settled
        None
    } else {
        show.animatein_duration.filter(|d| *d > 0.0)
    };
    let mut animation = Animation::enter(show.animatein_type, enter_duration);

    if let Some(visible_for) = visible_for {
        if offset + visible_for <= time_secs {
            animation = Animation::exit(show.animateout_type, show.animateout_duration);
        }
    }

    Some(OverlayState {
        key: identity(show.custom_id.as_deref(), action),
        custom_id: show.custom_id.clone(),
        svg_url: show.svg_url.clone(),
        position: show.position,
        size: show.size,
        variable_positions: show.variable_positions.clone().unwrap_or_default(),
        animation,
    })
}

fn apply_hide(
    overlays: &mut IndexMap<String, OverlayState>,
    action: &Action,
    hide: &HideOverlay,
    time_secs: f64,
    dispose: f64,
) {
    let key = identity(hide.custom_id.as_deref(), action);
    let exit_secs = positive_secs(hide.animateout_duration).unwrap_or(0.0);

    if action.offset_secs() + exit_secs + dispose < time_secs {
        overlays.shift_remove(&key);
        return;
    }

    match overlays.get_mut(&key) {
        Some(state) => {
            state.animation = Animation::exit(hide.animateout_type, hide.animateout_duration);
        }
        None => {
            tracing::debug!(action = %action.id, key = %key, "Hide for an overlay that is not shown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn log(actions: serde_json::Value) -> ActionLog {
        ActionLog::from_json(&actions.to_string()).unwrap()
    }

    fn show(id: &str, offset: u64, data: serde_json::Value) -> serde_json::Value {
        json!({"id": id, "offset": offset, "type": "show_overlay", "data": data})
    }

    fn hide(id: &str, offset: u64, data: serde_json::Value) -> serde_json::Value {
        json!({"id": id, "offset": offset, "type": "hide_overlay", "data": data})
    }

    #[test]
    fn test_duration_dispose_window() {
        let log = log(json!([show("a", 0, json!({"custom_id": "banner", "duration": 2000}))]));

        assert!(resolve_overlays(&log, 3.9).contains_key("banner"));
        assert!(!resolve_overlays(&log, 4.1).contains_key("banner"));
    }

    #[test]
    fn test_auto_hide_after_duration() {
        let log = log(json!([show("a", 0, json!({
            "custom_id": "banner", "duration": 2000,
            "animateout_type": "fade_out", "animateout_duration": 500
        }))]));

        assert!(!resolve_overlays(&log, 1.0)["banner"].animation.is_leaving());
        assert_eq!(
            resolve_overlays(&log, 2.5)["banner"].animation,
            Animation::Hide { kind: AnimateOut::FadeOut, duration_ms: Some(500.0) }
        );
    }

    #[test]
    fn test_not_shown_before_offset() {
        let log = log(json!([show("a", 5000, json!({"custom_id": "late"}))]));
        assert!(resolve_overlays(&log, 4.9).is_empty());
        assert_eq!(resolve_overlays(&log, 5.0).len(), 1);
    }

    #[test]
    fn test_enter_animation_suppressed_after_seek() {
        let log = log(json!([show("a", 10_000, json!({
            "custom_id": "score", "animatein_type": "slide_from_left", "animatein_duration": 800
        }))]));

        assert_eq!(
            resolve_overlays(&log, 11.0)["score"].animation,
            Animation::Show { kind: AnimateIn::SlideFromLeft, duration_ms: Some(800.0) }
        );
        assert_eq!(
            resolve_overlays(&log, 12.0)["score"].animation,
            Animation::Show { kind: AnimateIn::SlideFromLeft, duration_ms: None }
        );
    }

    #[test]
    fn test_show_without_enter_fields_is_settled() {
        let log = log(json!([show("a", 0, json!({"custom_id": "plain"}))]));
        assert_eq!(resolve_overlays(&log, 0.5)["plain"].animation, Animation::None);
    }

    #[test]
    fn test_hide_then_dispose() {
        let log = log(json!([
            show("a", 0, json!({"custom_id": "score"})),
            hide("b", 10_000, json!({"custom_id": "score", "animateout_type": "slide_to_right",
                                     "animateout_duration": 1000}))
        ]));

        assert_eq!(resolve_overlays(&log, 9.0)["score"].animation, Animation::None);
        assert_eq!(
            resolve_overlays(&log, 12.5)["score"].animation,
            Animation::Hide { kind: AnimateOut::SlideToRight, duration_ms: Some(1000.0) }
        );
        // 10s + 1s exit + 2s dispose
        assert!(!resolve_overlays(&log, 13.1).contains_key("score"));
    }

    #[test]
    fn test_later_show_replaces_wholesale() {
        let log = log(json!([
            show("a", 0, json!({"custom_id": "lower", "svg_url": "one.svg",
                                "variable_positions": ["$name"], "size": {"width": 30}})),
            show("b", 0, json!({"custom_id": "other"})),
            show("c", 3000, json!({"custom_id": "lower", "svg_url": "two.svg"}))
        ]));

        let overlays = resolve_overlays(&log, 5.0);
        let keys: Vec<&str> = overlays.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["lower", "other"]);
        let lower = &overlays["lower"];
        assert_eq!(lower.svg_url.as_deref(), Some("two.svg"));
        assert!(lower.variable_positions.is_empty());
        assert_eq!(lower.size, None);
    }

    #[test]
    fn test_action_id_is_fallback_identity() {
        let log = log(json!([
            show("overlay-1", 0, json!({"custom_id": ""})),
            hide("overlay-1", 1000, json!({}))
        ]));

        let overlays = resolve_overlays(&log, 1.5);
        assert!(overlays["overlay-1"].animation.is_leaving());
        assert!(resolve_overlays(&log, 3.5).is_empty());
    }

    #[test]
    fn test_reshow_after_hide() {
        let log = log(json!([
            show("a", 0, json!({"custom_id": "x"})),
            show("b", 0, json!({"custom_id": "y"})),
            hide("c", 1000, json!({"custom_id": "x"})),
            show("d", 10_000, json!({"custom_id": "x"}))
        ]));

        let keys_at = |t: f64| -> Vec<String> { resolve_overlays(&log, t).keys().cloned().collect() };
        assert_eq!(keys_at(5.0), vec!["y"]);
        assert_eq!(keys_at(10.0), vec!["y", "x"]);
    }

    #[test]
    fn test_hide_listed_before_show_still_applies() {
        let log = log(json!([
            hide("b", 4000, json!({"custom_id": "x"})),
            show("a", 1000, json!({"custom_id": "x"}))
        ]));

        assert!(resolve_overlays(&log, 4.5)["x"].animation.is_leaving());
        assert!(resolve_overlays(&log, 6.5).is_empty());
    }

    #[test]
    fn test_custom_dispose_timeout() {
        let log = log(json!([show("a", 0, json!({"custom_id": "x", "duration": 1000}))]));
        let config = EngineConfig { dispose_timeout_secs: 0.5, ..EngineConfig::default() };

        assert!(resolve_overlays_with(&log, 1.4, &config).contains_key("x"));
        assert!(resolve_overlays_with(&log, 1.6, &config).is_empty());
    }
}
