use crate::card::{DestinationCardId, WagonCardId, WagonColor};
use crate::map::RoadId;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Where the wagon cards of the current turn come from. A turn never mixes both.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawSource {
    #[default]
    None,
    FaceUp,
    FaceDown,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTickets {
    /// Destination tickets drawn, waiting for the player to pick which ones to keep.
    pub offered: SmallVec<[DestinationCardId; 3]>,
}

/// A tunnel claim waiting for its surcharge to be paid.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTunnel {
    pub road: RoadId,
    pub color: WagonColor,
    pub base_length: u8,
    pub extra_required: u8,
    /// Cards taken off the face-down pile. They belong to no pile until the claim resolves.
    pub revealed: Vec<WagonCardId>,
}

/// Ephemeral data shared between the phases of a turn.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TurnContext {
    pub current_player: usize,
    /// Wagon cards the current player may still draw: 2, 1, or 0.
    pub draws_remaining: u8,
    pub draw_source: DrawSource,
    pub final_round: bool,
    /// The player whose turn triggered the final round.
    pub final_round_starter: Option<usize>,
    /// How many offered tickets a player must keep at least.
    pub min_keep_tickets: usize,
    pub pending_tickets: PendingTickets,
    pub pending_tunnel: Option<PendingTunnel>,
    /// Increases with every announced turn.
    pub turn_serial: u64,
}

impl Default for TurnContext {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TurnContext {
    pub fn new(min_keep_tickets: usize) -> Self {
        Self {
            current_player: 0,
            draws_remaining: 2,
            draw_source: DrawSource::None,
            final_round: false,
            final_round_starter: None,
            min_keep_tickets,
            pending_tickets: PendingTickets::default(),
            pending_tunnel: None,
            turn_serial: 0,
        }
    }

    /// Back to the very first turn of a game.
    pub fn reset(&mut self, min_keep_tickets: usize) {
        *self = Self::new(min_keep_tickets);
    }

    /// Clears everything the previous turn left behind, keeping the current player.
    ///
    /// Offered tickets and revealed tunnel cards must have been handed back beforehand.
    pub fn begin_turn(&mut self) {
        self.draws_remaining = 2;
        self.draw_source = DrawSource::None;
        self.pending_tickets.offered.clear();
        self.pending_tunnel = None;
        self.turn_serial += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_begin_turn() {
        let mut context = TurnContext::new(1);
        context.current_player = 1;
        context.draws_remaining = 0;
        context.draw_source = DrawSource::FaceUp;
        context.final_round = true;
        context.pending_tickets.offered.push(DestinationCardId(4));

        context.begin_turn();

        assert_eq!(context.current_player, 1);
        assert_eq!(context.draws_remaining, 2);
        assert_eq!(context.draw_source, DrawSource::None);
        assert!(context.final_round);
        assert!(context.pending_tickets.offered.is_empty());
        assert_eq!(context.turn_serial, 1);
    }

    #[test]
    fn context_reset() {
        let mut context = TurnContext::new(1);
        context.current_player = 3;
        context.final_round_starter = Some(3);
        context.turn_serial = 12;

        context.reset(2);

        assert_eq!(context, TurnContext::new(2));
    }

    #[test]
    fn partial_json_to_context() -> serde_json::Result<()> {
        let context: TurnContext =
            serde_json::from_str(r#"{"currentPlayer": 1, "drawSource": "face-up"}"#)?;

        assert_eq!(context.current_player, 1);
        assert_eq!(context.draw_source, DrawSource::FaceUp);
        assert_eq!(context.draws_remaining, 2);
        assert_eq!(context.min_keep_tickets, 1);

        Ok(())
    }
}
