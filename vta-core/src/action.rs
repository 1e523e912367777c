//! Action log data structures and parsing

use crate::{priority, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A single timeline action, taking effect `offset_ms` after stream start
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Backend identifier, used as the overlay identity fallback
    pub id: String,
    /// Milliseconds from stream start
    pub offset_ms: u64,
    /// Typed payload
    pub kind: ActionKind,
}

impl Action {
    /// Creates a new action
    pub fn new(id: impl Into<String>, offset_ms: u64, kind: ActionKind) -> Self {
        Self {
            id: id.into(),
            offset_ms,
            kind,
        }
    }

    /// Offset in seconds
    pub fn offset_secs(&self) -> f64 {
        self.offset_ms as f64 / 1000.0
    }

    /// Converts one wire element into a typed action
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawAction = serde_json::from_value(value).map_err(|e| Error::InvalidAction {
            id: String::new(),
            reason: e.to_string(),
        })?;

        if !raw.offset.is_finite() || raw.offset < 0.0 {
            return Err(Error::InvalidAction {
                id: raw.id,
                reason: format!("offset {} is not a non-negative number", raw.offset),
            });
        }

        let tagged = serde_json::json!({ "type": raw.kind, "data": raw.data });
        let kind = ActionKind::deserialize(tagged).map_err(|e| Error::InvalidAction {
            id: raw.id.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self::new(raw.id, raw.offset.round() as u64, kind))
    }
}

/// Wire shape before the payload is matched against its type
#[derive(Deserialize)]
struct RawAction {
    #[serde(default)]
    id: String,
    offset: f64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Action payload, discriminated by the wire `type` field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ActionKind {
    SetVariable(SetVariable),
    IncrementVariable(IncrementVariable),
    CreateTimer(CreateTimer),
    StartTimer(TimerTarget),
    PauseTimer(TimerTarget),
    AdjustTimer(TimerValue),
    SkipTimer(TimerValue),
    ShowOverlay(ShowOverlay),
    HideOverlay(HideOverlay),
}

impl ActionKind {
    /// Wire name of this action type
    pub fn type_name(&self) -> &'static str {
        match self {
            ActionKind::SetVariable(_) => "set_variable",
            ActionKind::IncrementVariable(_) => "increment_variable",
            ActionKind::CreateTimer(_) => "create_timer",
            ActionKind::StartTimer(_) => "start_timer",
            ActionKind::PauseTimer(_) => "pause_timer",
            ActionKind::AdjustTimer(_) => "adjust_timer",
            ActionKind::SkipTimer(_) => "skip_timer",
            ActionKind::ShowOverlay(_) => "show_overlay",
            ActionKind::HideOverlay(_) => "hide_overlay",
        }
    }
}

/// Declared storage type of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum VariableType {
    #[default]
    Double,
    Long,
    String,
}

impl From<String> for VariableType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "long" => VariableType::Long,
            "string" => VariableType::String,
            _ => VariableType::Double,
        }
    }
}

/// A variable value as sent by the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SetVariable {
    pub name: String,
    #[serde(rename = "type", default)]
    pub value_type: VariableType,
    pub value: VariableValue,
    pub double_precision: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncrementVariable {
    pub name: String,
    pub amount: Option<f64>,
}

/// Timer display format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TimerFormat {
    /// `MM:SS`
    Ms,
    /// Whole seconds
    #[default]
    S,
}

/// Anything other than `ms` renders as seconds
impl From<String> for TimerFormat {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ms" => TimerFormat::Ms,
            _ => TimerFormat::S,
        }
    }
}

/// Counting direction of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum TimerDirection {
    #[default]
    Up,
    Down,
}

impl From<String> for TimerDirection {
    fn from(value: String) -> Self {
        match value.as_str() {
            "down" => TimerDirection::Down,
            _ => TimerDirection::Up,
        }
    }
}

impl TimerDirection {
    /// `+1` when counting up, `-1` when counting down
    pub fn sign(self) -> f64 {
        match self {
            TimerDirection::Up => 1.0,
            TimerDirection::Down => -1.0,
        }
    }
}

/// Timer definition; all durations in milliseconds
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateTimer {
    pub name: String,
    pub format: Option<TimerFormat>,
    pub direction: Option<TimerDirection>,
    pub start_value: Option<f64>,
    pub step: Option<f64>,
    pub cap_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimerTarget {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimerValue {
    pub name: String,
    pub value: Option<f64>,
}

/// Placement of an overlay, each field a percentage of the stage
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverlayPosition {
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub vcenter: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub hcenter: Option<f64>,
}

/// Size of an overlay as a percentage of the stage
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverlaySize {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Enter animation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum AnimateIn {
    #[default]
    None,
    FadeIn,
    SlideFromLeft,
    SlideFromRight,
    SlideFromTop,
    SlideFromBottom,
}

impl From<String> for AnimateIn {
    fn from(value: String) -> Self {
        match value.as_str() {
            "fade_in" => AnimateIn::FadeIn,
            "slide_from_left" => AnimateIn::SlideFromLeft,
            "slide_from_right" => AnimateIn::SlideFromRight,
            "slide_from_top" => AnimateIn::SlideFromTop,
            "slide_from_bottom" => AnimateIn::SlideFromBottom,
            _ => AnimateIn::None,
        }
    }
}

/// Exit animation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum AnimateOut {
    #[default]
    None,
    FadeOut,
    SlideToLeft,
    SlideToRight,
    SlideToTop,
    SlideToBottom,
}

impl From<String> for AnimateOut {
    fn from(value: String) -> Self {
        match value.as_str() {
            "fade_out" => AnimateOut::FadeOut,
            "slide_to_left" => AnimateOut::SlideToLeft,
            "slide_to_right" => AnimateOut::SlideToRight,
            "slide_to_top" => AnimateOut::SlideToTop,
            "slide_to_bottom" => AnimateOut::SlideToBottom,
            _ => AnimateOut::None,
        }
    }
}

/// Overlay to display; durations in milliseconds
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ShowOverlay {
    pub custom_id: Option<String>,
    pub svg_url: Option<String>,
    pub position: Option<OverlayPosition>,
    pub size: Option<OverlaySize>,
    pub variable_positions: Option<Vec<String>>,
    /// Auto-hide after this many milliseconds
    pub duration: Option<f64>,
    pub animatein_type: Option<AnimateIn>,
    pub animatein_duration: Option<f64>,
    pub animateout_type: Option<AnimateOut>,
    pub animateout_duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct HideOverlay {
    pub custom_id: Option<String>,
    pub animateout_type: Option<AnimateOut>,
    pub animateout_duration: Option<f64>,
}

/// Either a bare action array or a timeline response wrapping one
#[derive(Deserialize)]
#[serde(untagged)]
enum LogDocument {
    Actions(Vec<serde_json::Value>),
    Response {
        actions: Vec<serde_json::Value>,
        #[serde(default)]
        update_id: Option<String>,
    },
}

/// Immutable action history handed to the resolvers
#[derive(Debug, Clone, Default)]
pub struct ActionLog {
    actions: Vec<Action>,
    skipped: usize,
    update_id: Option<String>,
}

impl ActionLog {
    /// Creates a log from already-typed actions
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            actions,
            skipped: 0,
            update_id: None,
        }
    }

    /// Parses a JSON document, skipping elements that are not valid actions
    pub fn from_json(json: &str) -> Result<Self> {
        let document: LogDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(document))
    }

    /// Reads a JSON document from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let document: LogDocument = serde_json::from_reader(reader)?;
        Ok(Self::from_document(document))
    }

    /// Reads a JSON document from a file
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    fn from_document(document: LogDocument) -> Self {
        let (elements, update_id) = match document {
            LogDocument::Actions(actions) => (actions, None),
            LogDocument::Response { actions, update_id } => (actions, update_id),
        };

        let mut actions = Vec::with_capacity(elements.len());
        let mut skipped = 0;
        for element in elements {
            match Action::from_value(element) {
                Ok(action) => actions.push(action),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed action");
                    skipped += 1;
                }
            }
        }

        Self {
            actions,
            skipped,
            update_id,
        }
    }

    /// Actions in their original log order
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Actions in fold order: offset ascending, then priority descending.
    /// The sort is stable, so equal keys keep their log order.
    pub fn ordered(&self) -> Vec<&Action> {
        let mut ordered: Vec<&Action> = self.actions.iter().collect();
        ordered.sort_by(|a, b| priority::compare_actions(a, b));
        ordered
    }

    /// Number of elements dropped while parsing
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Polling cursor from a timeline response, if any
    pub fn update_id(&self) -> Option<&str> {
        self.update_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
