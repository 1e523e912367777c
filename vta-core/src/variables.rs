//! Variable resolution

use crate::action::{ActionKind, VariableValue};
use crate::format::format_variable;
use crate::timeline::reached;
use crate::{ActionLog, ValueMap};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct VariableState {
    value: VariableValue,
    precision: u32,
}

impl VariableState {
    fn display(&self) -> String {
        match &self.value {
            VariableValue::Number(n) => format_variable(*n, self.precision),
            VariableValue::Text(text) => text.clone(),
        }
    }
}

/// Folds `set_variable` / `increment_variable` actions up to `time_secs`
/// into name → formatted value.
pub fn resolve_variables(log: &ActionLog, time_secs: f64) -> ValueMap {
    let mut states: BTreeMap<&str, VariableState> = BTreeMap::new();

    for action in log
        .ordered()
        .into_iter()
        .take_while(|a| reached(a.offset_ms, time_secs))
    {
        match &action.kind {
            ActionKind::SetVariable(set) => {
                states.insert(
                    &set.name,
                    VariableState {
                        value: set.value.clone(),
                        precision: set.double_precision.unwrap_or(0),
                    },
                );
            }
            ActionKind::IncrementVariable(inc) => match states.get_mut(inc.name.as_str()) {
                Some(VariableState {
                    value: VariableValue::Number(n),
                    ..
                }) => *n += inc.amount.unwrap_or(0.0),
                Some(_) => {
                    tracing::debug!(action = %action.id, name = %inc.name, "Cannot increment a text variable");
                }
                None => {
                    tracing::debug!(action = %action.id, name = %inc.name, "Increment of unset variable skipped");
                }
            },
            _ => {}
        }
    }

    states
        .into_iter()
        .map(|(name, state)| (name.to_string(), state.display()))
        .collect()
}
