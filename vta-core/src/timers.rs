//! Timer resolution
//!
//! Timers are never ticked. Each evaluation replays the timer actions up to
//! the cutoff and measures running intervals against the cutoff itself, so
//! a backward seek simply produces the earlier value.

use crate::action::{ActionKind, TimerDirection, TimerFormat};
use crate::format::format_timer;
use crate::timeline::reached;
use crate::{ActionLog, ValueMap};
use std::collections::BTreeMap;

const DEFAULT_STEP_MS: f64 = 1000.0;

/// Derived state of one timer, rebuilt on every fold
#[derive(Debug, Clone, PartialEq)]
pub struct TimerState {
    pub is_started: bool,
    /// Running interval measured to the cutoff; zero while paused
    pub current_interval_ms: f64,
    /// Committed value in milliseconds
    pub total_ms: f64,
    pub format: TimerFormat,
    pub step_ms: f64,
    pub direction: TimerDirection,
    pub cap_ms: Option<f64>,
}

impl TimerState {
    /// Current value in seconds after cap and step truncation
    pub fn value_secs(&self) -> f64 {
        let mut value_ms = self.total_ms + self.current_interval_ms * self.direction.sign();

        if let Some(cap) = self.cap_ms {
            value_ms = match self.direction {
                TimerDirection::Up => value_ms.min(cap),
                TimerDirection::Down => value_ms.max(cap),
            };
        }

        if self.step_ms > 0.0 {
            value_ms -= value_ms % self.step_ms;
        }

        value_ms / 1000.0
    }

    pub fn display(&self) -> String {
        format_timer(self.value_secs(), self.format)
    }
}

/// Replays timer actions up to `time_secs` and returns each timer's state
pub fn fold_timers(log: &ActionLog, time_secs: f64) -> BTreeMap<String, TimerState> {
    let now_ms = time_secs * 1000.0;
    let mut timers: BTreeMap<String, TimerState> = BTreeMap::new();

    for action in log
        .ordered()
        .into_iter()
        .take_while(|a| reached(a.offset_ms, time_secs))
    {
        let since_ms = now_ms - action.offset_ms as f64;

        let name = match &action.kind {
            ActionKind::CreateTimer(create) => {
                timers.insert(
                    create.name.clone(),
                    TimerState {
                        is_started: false,
                        current_interval_ms: 0.0,
                        total_ms: create.start_value.unwrap_or(0.0),
                        format: create.format.unwrap_or_default(),
                        step_ms: create
                            .step
                            .filter(|s| *s > 0.0)
                            .unwrap_or(DEFAULT_STEP_MS),
                        direction: create.direction.unwrap_or_default(),
                        cap_ms: create.cap_value.filter(|c| *c != 0.0),
                    },
                );
                continue;
            }
            ActionKind::StartTimer(target) | ActionKind::PauseTimer(target) => &target.name,
            ActionKind::AdjustTimer(target) | ActionKind::SkipTimer(target) => &target.name,
            _ => continue,
        };

        let Some(timer) = timers.get_mut(name) else {
            tracing::debug!(action = %action.id, name = %name, "Action on uncreated timer skipped");
            continue;
        };

        match &action.kind {
            ActionKind::StartTimer(_) => {
                timer.is_started = true;
                timer.current_interval_ms = since_ms;
            }
            ActionKind::PauseTimer(_) => {
                if timer.is_started {
                    timer.total_ms +=
                        (timer.current_interval_ms - since_ms) * timer.direction.sign();
                    timer.current_interval_ms = 0.0;
                    timer.is_started = false;
                }
            }
            ActionKind::AdjustTimer(adjust) => {
                timer.total_ms = adjust.value.unwrap_or(0.0);
                timer.current_interval_ms = if timer.is_started { since_ms } else { 0.0 };
            }
            ActionKind::SkipTimer(skip) => {
                timer.total_ms += skip.value.unwrap_or(0.0);
            }
            _ => {}
        }
    }

    timers
}

/// Folds timer actions up to `time_secs` into name → formatted value
pub fn resolve_timers(log: &ActionLog, time_secs: f64) -> ValueMap {
    fold_timers(log, time_secs)
        .into_iter()
        .map(|(name, timer)| {
            let display = timer.display();
            (name, display)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn log(actions: serde_json::Value) -> ActionLog {
        ActionLog::from_json(&actions.to_string()).unwrap()
    }

    fn timer_action(kind: &str, offset: u64, data: serde_json::Value) -> serde_json::Value {
        json!({"id": format!("{}-{}", kind, offset), "offset": offset, "type": kind, "data": data})
    }

    fn stopwatch(extra: serde_json::Value) -> serde_json::Value {
        let mut data = json!({"name": "t", "format": "s", "direction": "up", "start_value": 0});
        if let (Some(data), Some(extra)) = (data.as_object_mut(), extra.as_object()) {
            data.extend(extra.clone());
        }
        timer_action("create_timer", 0, data)
    }

    #[test]
    fn test_pause_stops_accumulation() {
        let log = log(json!([
            stopwatch(json!({})),
            timer_action("start_timer", 0, json!({"name": "t"})),
            timer_action("pause_timer", 5000, json!({"name": "t"}))
        ]));

        assert_eq!(resolve_timers(&log, 5.0)["t"], "5");
        assert_eq!(resolve_timers(&log, 10.0)["t"], "5");
        assert_eq!(resolve_timers(&log, 2.0)["t"], "2");
    }

    #[test]
    fn test_resume_after_pause() {
        let log = log(json!([
            stopwatch(json!({})),
            timer_action("start_timer", 0, json!({"name": "t"})),
            timer_action("pause_timer", 5000, json!({"name": "t"})),
            timer_action("pause_timer", 6000, json!({"name": "t"})),
            timer_action("start_timer", 8000, json!({"name": "t"}))
        ]));

        assert_eq!(resolve_timers(&log, 7.0)["t"], "5");
        assert_eq!(resolve_timers(&log, 10.0)["t"], "7");
    }

    #[test]
    fn test_cap_limits_count_up() {
        let log = log(json!([
            stopwatch(json!({"cap_value": 10000})),
            timer_action("start_timer", 0, json!({"name": "t"}))
        ]));

        assert_eq!(resolve_timers(&log, 20.0)["t"], "10");
        assert_eq!(resolve_timers(&log, 4.0)["t"], "4");
    }

    #[test]
    fn test_countdown_with_pause() {
        let log = log(json!([
            timer_action("create_timer", 0, json!({"name": "clock", "format": "ms",
                "direction": "down", "start_value": 60000})),
            timer_action("start_timer", 0, json!({"name": "clock"})),
            timer_action("pause_timer", 10000, json!({"name": "clock"}))
        ]));

        assert_eq!(resolve_timers(&log, 5.0)["clock"], "00:55");
        assert_eq!(resolve_timers(&log, 15.0)["clock"], "00:50");
    }

    #[test]
    fn test_countdown_past_zero_renders_zero() {
        let log = log(json!([
            timer_action("create_timer", 0, json!({"name": "t", "direction": "down", "start_value": 3000})),
            timer_action("start_timer", 0, json!({"name": "t"}))
        ]));

        assert_eq!(resolve_timers(&log, 10.0)["t"], "0");
    }

    #[test]
    fn test_adjust_while_running() {
        let log = log(json!([
            stopwatch(json!({})),
            timer_action("start_timer", 0, json!({"name": "t"})),
            timer_action("adjust_timer", 10000, json!({"name": "t", "value": 30000}))
        ]));

        assert_eq!(resolve_timers(&log, 12.0)["t"], "32");
    }

    #[test]
    fn test_adjust_while_paused_and_skip() {
        let log = log(json!([
            stopwatch(json!({})),
            timer_action("adjust_timer", 1000, json!({"name": "t", "value": 2700000})),
            timer_action("skip_timer", 2000, json!({"name": "t", "value": 60000}))
        ]));

        assert_eq!(resolve_timers(&log, 1.5)["t"], "2700");
        assert_eq!(resolve_timers(&log, 3.0)["t"], "2760");
    }

    #[test]
    fn test_step_truncates_to_last_boundary() {
        let log = log(json!([
            stopwatch(json!({"step": 5000})),
            timer_action("start_timer", 0, json!({"name": "t"}))
        ]));

        assert_eq!(resolve_timers(&log, 12.3)["t"], "10");
        assert_eq!(resolve_timers(&log, 4.99)["t"], "0");
    }

    #[test]
    fn test_minutes_format() {
        let log = log(json!([
            timer_action("create_timer", 0, json!({"name": "match", "format": "ms", "start_value": 2700000})),
            timer_action("start_timer", 0, json!({"name": "match"}))
        ]));

        assert_eq!(resolve_timers(&log, 65.0)["match"], "46:05");
    }

    #[test]
    fn test_uncreated_timer_is_ignored() {
        let log = log(json!([
            timer_action("start_timer", 0, json!({"name": "ghost"})),
            timer_action("skip_timer", 0, json!({"name": "ghost", "value": 1000})),
            stopwatch(json!({}))
        ]));

        let timers = resolve_timers(&log, 5.0);
        assert!(!timers.contains_key("ghost"));
        assert_eq!(timers["t"], "0");
    }

    #[test]
    fn test_start_before_create_in_log_order() {
        // Same offset: create must fold before start regardless of log order
        let log = log(json!([
            timer_action("start_timer", 1000, json!({"name": "t"})),
            timer_action("create_timer", 1000, json!({"name": "t", "start_value": 0}))
        ]));

        assert_eq!(resolve_timers(&log, 4.0)["t"], "3");
    }

    #[test]
    fn test_fold_exposes_state() {
        let log = log(json!([
            stopwatch(json!({})),
            timer_action("start_timer", 1000, json!({"name": "t"}))
        ]));

        let state = &fold_timers(&log, 3.0)["t"];
        assert!(state.is_started);
        assert_eq!(state.current_interval_ms, 2000.0);
        assert_eq!(state.step_ms, 1000.0);
        assert_eq!(state.cap_ms, None);
    }

    proptest! {
        #[test]
        fn test_seek_safety(
            offsets in prop::collection::vec(0u64..60_000, 1..12),
            t1 in 0.0f64..90.0,
            t2 in 0.0f64..90.0,
        ) {
            let mut actions = vec![stopwatch(json!({"cap_value": 45000}))];
            for (i, offset) in offsets.iter().enumerate() {
                let kind = if i % 2 == 0 { "start_timer" } else { "pause_timer" };
                actions.push(timer_action(kind, *offset, json!({"name": "t"})));
            }
            let log = log(serde_json::Value::Array(actions));

            let first = resolve_timers(&log, t1);
            let _ = resolve_timers(&log, t2);
            prop_assert_eq!(resolve_timers(&log, t1), first);
        }
    }
}
