//! Fold ordering for actions sharing an offset

use crate::{Action, ActionKind};
use std::cmp::Ordering;

/// Fixed priority of an action type; higher folds first within an offset.
///
/// State-creating actions come before state-mutating ones, which come
/// before visibility changes.
pub fn priority(kind: &ActionKind) -> u32 {
    match kind {
        ActionKind::SetVariable(_) | ActionKind::CreateTimer(_) => 1000,
        ActionKind::IncrementVariable(_) | ActionKind::StartTimer(_) => 500,
        ActionKind::PauseTimer(_) => 400,
        ActionKind::AdjustTimer(_) => 300,
        ActionKind::SkipTimer(_) => 200,
        ActionKind::ShowOverlay(_) => 100,
        ActionKind::HideOverlay(_) => 50,
    }
}

/// Total fold order: offset ascending, then priority descending.
///
/// Equal keys compare `Equal`, so a stable sort keeps log order for them.
pub fn compare_actions(a: &Action, b: &Action) -> Ordering {
    a.offset_ms
        .cmp(&b.offset_ms)
        .then_with(|| priority(&b.kind).cmp(&priority(&a.kind)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ShowOverlay, TimerTarget};
    use crate::ActionLog;

    fn start(id: &str, offset_ms: u64) -> Action {
        Action::new(id, offset_ms, ActionKind::StartTimer(TimerTarget { name: "t".into() }))
    }

    fn show(id: &str, offset_ms: u64) -> Action {
        Action::new(id, offset_ms, ActionKind::ShowOverlay(ShowOverlay::default()))
    }

    #[test]
    fn test_priority_breaks_offset_ties() {
        assert_eq!(compare_actions(&show("a", 100), &start("b", 100)), Ordering::Greater);
        assert_eq!(compare_actions(&start("b", 100), &show("a", 100)), Ordering::Less);
    }

    #[test]
    fn test_offset_dominates_priority() {
        // A low-priority action at an earlier offset still folds first
        assert_eq!(compare_actions(&show("a", 100), &start("b", 200)), Ordering::Less);
    }

    #[test]
    fn test_ordered_is_stable_for_equal_keys() {
        let log = ActionLog::new(vec![
            show("first", 0),
            start("timer", 500),
            show("second", 0),
            start("early", 0),
        ]);

        let ids: Vec<&str> = log.ordered().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "first", "second", "timer"]);
    }
}
