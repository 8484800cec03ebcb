use crate::card::WagonColor;
use crate::map::RoadId;

use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// The kinds of command a controller may send to the engine.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, EnumString, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CommandType {
    DrawDestination,
    DrawFaceup,
    DrawFacedown,
    TakeRoad,
    BorrowRoad,
    ClaimStation,
    SelectDestination,
    ConfirmEndTurn,
    Exit,
    Help,
}

impl CommandType {
    /// Whether an AI may pick this kind of command. Leaving and asking for help are reserved
    /// to humans.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_europe::command::CommandType;
    ///
    /// assert!(CommandType::TakeRoad.is_supported());
    /// assert!(!CommandType::Help.is_supported());
    /// ```
    pub fn is_supported(&self) -> bool {
        !matches!(self, CommandType::Exit | CommandType::Help)
    }
}

/// A typed command, as produced by a controller.
///
/// # JSON
/// Commands are tagged by their kebab-case `type`, e.g.
/// `{"type": "take-road", "road": 12, "color": "red"}`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Command {
    DrawDestination,
    /// Draws the face-up card at a 0-based slot.
    DrawFaceup {
        index: usize,
    },
    DrawFacedown,
    /// Claims a road. Without a color, gray roads are paid with the color held most.
    TakeRoad {
        road: RoadId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<WagonColor>,
    },
    BorrowRoad {
        road: RoadId,
    },
    ClaimStation {
        station: String,
        color: WagonColor,
    },
    /// Keeps the offered destination tickets at the given 1-based positions.
    SelectDestination {
        indices: Vec<usize>,
    },
    ConfirmEndTurn,
    Exit,
    Help,
}

impl Command {
    pub fn kind(&self) -> CommandType {
        match self {
            Command::DrawDestination => CommandType::DrawDestination,
            Command::DrawFaceup { .. } => CommandType::DrawFaceup,
            Command::DrawFacedown => CommandType::DrawFacedown,
            Command::TakeRoad { .. } => CommandType::TakeRoad,
            Command::BorrowRoad { .. } => CommandType::BorrowRoad,
            Command::ClaimStation { .. } => CommandType::ClaimStation,
            Command::SelectDestination { .. } => CommandType::SelectDestination,
            Command::ConfirmEndTurn => CommandType::ConfirmEndTurn,
            Command::Exit => CommandType::Exit,
            Command::Help => CommandType::Help,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;

        match self {
            Command::DrawFaceup { index } => write!(f, " {}", index),
            Command::TakeRoad { road, color } => match color {
                Some(color) => write!(f, " {} {}", road, color),
                None => write!(f, " {}", road),
            },
            Command::BorrowRoad { road } => write!(f, " {}", road),
            Command::ClaimStation { station, color } => write!(f, " {} {}", station, color),
            Command::SelectDestination { indices } => {
                for index in indices {
                    write!(f, " {}", index)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    // Tests for `CommandType`.

    #[test]
    fn command_type_to_string() {
        assert_eq!(CommandType::DrawFaceup.to_string(), "draw-faceup");
        assert_eq!(CommandType::ConfirmEndTurn.to_string(), "confirm-end-turn");
        assert_eq!(
            CommandType::from_str("select-destination"),
            Ok(CommandType::SelectDestination)
        );
    }

    #[test]
    fn supported_command_types() {
        let supported: Vec<_> = CommandType::iter().filter(CommandType::is_supported).collect();

        assert_eq!(supported.len(), 8);
        assert!(!supported.contains(&CommandType::Exit));
        assert!(!supported.contains(&CommandType::Help));
    }

    // Tests for `Command`.

    #[test]
    fn command_kind() {
        assert_eq!(
            Command::DrawFaceup { index: 2 }.kind(),
            CommandType::DrawFaceup
        );
        assert_eq!(
            Command::SelectDestination {
                indices: vec![1, 2]
            }
            .kind(),
            CommandType::SelectDestination
        );
    }

    #[test]
    fn command_to_string() {
        assert_eq!(Command::DrawFacedown.to_string(), "draw-facedown");
        assert_eq!(
            Command::TakeRoad {
                road: RoadId(12),
                color: Some(WagonColor::Red)
            }
            .to_string(),
            "take-road 12 red"
        );
        assert_eq!(
            Command::ClaimStation {
                station: String::from("Wien"),
                color: WagonColor::Locomotive
            }
            .to_string(),
            "claim-station Wien locomotive"
        );
        assert_eq!(
            Command::SelectDestination {
                indices: vec![1, 3]
            }
            .to_string(),
            "select-destination 1 3"
        );
    }

    #[test]
    fn json_to_command() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::from_str::<Command>(r#"{"type": "draw-faceup", "index": 4}"#)?,
            Command::DrawFaceup { index: 4 }
        );
        assert_eq!(
            serde_json::from_str::<Command>(r#"{"type": "take-road", "road": 7}"#)?,
            Command::TakeRoad {
                road: RoadId(7),
                color: None
            }
        );
        assert_eq!(
            serde_json::from_str::<Command>(
                r#"{"type": "claim-station", "station": "Roma", "color": "wild"}"#
            )?,
            Command::ClaimStation {
                station: String::from("Roma"),
                color: WagonColor::Locomotive
            }
        );
        assert!(serde_json::from_str::<Command>(r#"{"type": "fly"}"#).is_err());

        Ok(())
    }

    #[test]
    fn command_to_json() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::to_string(&Command::ConfirmEndTurn)?,
            r#"{"type":"confirm-end-turn"}"#
        );
        assert_eq!(
            serde_json::to_string(&Command::TakeRoad {
                road: RoadId(3),
                color: None
            })?,
            r#"{"type":"take-road","road":3}"#
        );

        Ok(())
    }
}
