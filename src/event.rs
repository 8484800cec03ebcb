use crate::error::GameError;
use crate::phase::Phase;

use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::Display;

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum EventKind {
    Info,
    Error,
}

/// A human-readable message for the presentation layer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EngineEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub message: String,
}

impl EngineEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Error,
            message: message.into(),
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.kind == EventKind::Error
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Outcome of one command, cascade included.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResult {
    /// Whether the command sent by the caller was accepted.
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The phase the engine ended up in. `None` once the engine is torn down.
    pub next_phase: Option<Phase>,
    /// Events in the order they happened.
    pub events: Vec<EngineEvent>,
}

impl EngineResult {
    /// A rejected command that never reached a phase.
    pub fn failure(error: &GameError, next_phase: Option<Phase>) -> Self {
        let message = error.to_string();
        Self {
            ok: false,
            events: vec![EngineEvent::error(message.clone())],
            error: Some(message),
            next_phase,
        }
    }

    /// Messages of every event, in order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|event| event.message.as_str())
    }
}
