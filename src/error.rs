use crate::command::CommandType;
use crate::phase::Phase;

use serde::Serialize;
use strum_macros::Display;
use thiserror::Error;

/// The four families of failure a command can run into.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorCategory {
    /// The command is not accepted by the current phase.
    IllegalCommand,
    /// The engine is missing a piece of its state. A setup bug, never a player mistake.
    MissingState,
    /// The command refers to something that does not exist, or is malformed.
    InvalidPayload,
    /// The command is well-formed but breaks a game rule.
    RuleViolation,
}

/// Why a command was rejected.
///
/// None of these are fatal: the state is left untouched, and the caller may retry.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum GameError {
    #[error("Command `{command}` is not allowed during the {phase} phase.")]
    IllegalCommand { command: CommandType, phase: Phase },
    #[error("The engine has no {0}.")]
    MissingState(&'static str),
    #[error("{0}")]
    InvalidPayload(String),
    #[error("{0}")]
    RuleViolation(String),
}

impl GameError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GameError::IllegalCommand { .. } => ErrorCategory::IllegalCommand,
            GameError::MissingState(_) => ErrorCategory::MissingState,
            GameError::InvalidPayload(_) => ErrorCategory::InvalidPayload,
            GameError::RuleViolation(_) => ErrorCategory::RuleViolation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let error = GameError::IllegalCommand {
            command: CommandType::DrawFaceup,
            phase: Phase::Confirmation,
        };
        assert_eq!(
            error.to_string(),
            "Command `draw-faceup` is not allowed during the confirmation phase."
        );
        assert_eq!(error.category(), ErrorCategory::IllegalCommand);

        let error = GameError::MissingState("state machine");
        assert_eq!(error.to_string(), "The engine has no state machine.");
        assert_eq!(error.category(), ErrorCategory::MissingState);
    }

    #[test]
    fn error_category_to_string() {
        assert_eq!(ErrorCategory::RuleViolation.to_string(), "rule-violation");
        assert_eq!(ErrorCategory::InvalidPayload.to_string(), "invalid-payload");
    }
}
