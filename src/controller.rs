use crate::command::{Command, CommandType};
use crate::context::{DrawSource, TurnContext};
use crate::event::EngineResult;
use crate::map::RoadId;
use crate::phase::claim::{check_borrow, plan_road, plan_station};
use crate::phase::Phase;
use crate::state::GameState;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// What a controller gets to see when asked for a command.
pub struct ControllerView<'a> {
    pub state: &'a GameState,
    pub context: &'a TurnContext,
    pub phase: Phase,
    /// The seat the command is asked for.
    pub player: usize,
}

impl ControllerView<'_> {
    #[inline]
    pub fn allowed_commands(&self) -> &'static [CommandType] {
        self.phase.allowed_commands()
    }
}

/// Produces commands for one seat.
pub trait Controller {
    fn is_human(&self) -> bool;

    /// The command to play next, if any.
    fn next_command(&mut self, view: &ControllerView<'_>) -> Option<Command>;

    /// Called with the result of every command the engine processed.
    fn notify(&mut self, _result: &EngineResult) {}
}

/// A seat played from the outside: commands reach the engine through
/// [`crate::engine::Engine::handle_command`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HumanController;

impl Controller for HumanController {
    fn is_human(&self) -> bool {
        true
    }

    fn next_command(&mut self, _view: &ControllerView<'_>) -> Option<Command> {
        None
    }
}

/// Plays uniformly at random among the allowed command kinds that it can play right now.
#[derive(Clone, Debug)]
pub struct AiController {
    rng: ChaCha8Rng,
}

impl AiController {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// A legal command of the given kind, if there is one.
    fn build(&mut self, view: &ControllerView<'_>, kind: CommandType) -> Option<Command> {
        let ControllerView {
            state,
            context,
            player,
            ..
        } = *view;

        match kind {
            CommandType::DrawDestination => {
                (state.cards.count_destinations() > 0).then_some(Command::DrawDestination)
            }
            CommandType::DrawFaceup => {
                if context.draws_remaining == 0 || context.draw_source == DrawSource::FaceDown {
                    return None;
                }
                let slots: Vec<_> = (0..state.config.face_up_cards)
                    .filter(|slot| {
                        state
                            .cards
                            .face_up_card(*slot)
                            .and_then(|card| state.cards.wagon_color(card))
                            .map_or(false, |color| {
                                !color.is_locomotive() || context.draws_remaining == 2
                            })
                    })
                    .collect();
                slots
                    .choose(&mut self.rng)
                    .map(|index| Command::DrawFaceup { index: *index })
            }
            CommandType::DrawFacedown => (context.draws_remaining > 0
                && context.draw_source != DrawSource::FaceUp
                && state.cards.can_draw_face_down())
            .then_some(Command::DrawFacedown),
            CommandType::TakeRoad => {
                let roads: Vec<_> = state
                    .map
                    .get_claimable_roads(state.party_size(), player)
                    .into_iter()
                    .filter(|road| plan_road(state, player, *road, None).is_ok())
                    .collect();
                roads
                    .choose(&mut self.rng)
                    .map(|road| Command::TakeRoad {
                        road: *road,
                        color: None,
                    })
            }
            CommandType::ClaimStation => {
                let color = state.players.get(player)?.best_color(state.cards.catalog());
                // Only where a road owned by someone else could then be borrowed.
                let stations: Vec<_> = state
                    .map
                    .stations()
                    .iter()
                    .filter(|station| {
                        state.map.roads_at(station.id).any(|road| {
                            road.owner.map_or(false, |owner| owner != player)
                        })
                    })
                    .filter(|station| plan_station(state, player, &station.name, color).is_ok())
                    .collect();
                stations
                    .choose(&mut self.rng)
                    .map(|station| Command::ClaimStation {
                        station: station.name.clone(),
                        color,
                    })
            }
            CommandType::BorrowRoad => {
                let roads: Vec<RoadId> = state
                    .map
                    .roads()
                    .iter()
                    .map(|road| road.id)
                    .filter(|road| check_borrow(state, player, *road).is_ok())
                    .collect();
                roads
                    .choose(&mut self.rng)
                    .map(|road| Command::BorrowRoad { road: *road })
            }
            CommandType::SelectDestination => {
                let keep = context
                    .min_keep_tickets
                    .min(context.pending_tickets.offered.len());
                Some(Command::SelectDestination {
                    indices: (1..=keep).collect(),
                })
            }
            CommandType::ConfirmEndTurn => Some(Command::ConfirmEndTurn),
            CommandType::Exit | CommandType::Help => None,
        }
    }
}

impl Controller for AiController {
    fn is_human(&self) -> bool {
        false
    }

    fn next_command(&mut self, view: &ControllerView<'_>) -> Option<Command> {
        let mut kinds: Vec<_> = view
            .allowed_commands()
            .iter()
            .copied()
            .filter(CommandType::is_supported)
            .collect();
        kinds.shuffle(&mut self.rng);

        kinds.into_iter().find_map(|kind| self.build(view, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::state::default_player_names;

    fn state() -> GameState {
        let mut state =
            GameState::europe(default_player_names(2), GameConfig::default(), 42).unwrap();
        state.deal();
        state
    }

    #[test]
    fn human_controller_never_plays() {
        let state = state();
        let context = TurnContext::default();
        let view = ControllerView {
            state: &state,
            context: &context,
            phase: Phase::PlayerTurn,
            player: 0,
        };

        assert!(HumanController.is_human());
        assert_eq!(HumanController.next_command(&view), None);
    }

    #[test]
    fn ai_controller_plays_allowed_commands() {
        let state = state();
        let context = TurnContext::default();
        let mut ai = AiController::new(7);

        for phase in [Phase::PlayerTurn, Phase::DrawWagon, Phase::FaceUp] {
            let view = ControllerView {
                state: &state,
                context: &context,
                phase,
                player: 0,
            };
            for _ in 0..20 {
                let command = ai.next_command(&view).unwrap();
                assert!(phase.allows(command.kind()), "{} in {}", command, phase);
                assert!(command.kind().is_supported());
            }
        }
    }

    #[test]
    fn ai_controller_is_reproducible() {
        let state = state();
        let context = TurnContext::default();
        let view = ControllerView {
            state: &state,
            context: &context,
            phase: Phase::PlayerTurn,
            player: 1,
        };

        let mut first = AiController::new(3);
        let mut second = AiController::new(3);
        for _ in 0..10 {
            assert_eq!(first.next_command(&view), second.next_command(&view));
        }
    }

    #[test]
    fn ai_controller_skips_locomotives_on_second_draw() {
        let state = state();
        let mut context = TurnContext::default();
        context.draws_remaining = 1;
        context.draw_source = DrawSource::FaceUp;
        let view = ControllerView {
            state: &state,
            context: &context,
            phase: Phase::FaceUp,
            player: 0,
        };
        let mut ai = AiController::new(11);

        for _ in 0..20 {
            match ai.next_command(&view) {
                Some(Command::DrawFaceup { index }) => {
                    let card = state.cards.face_up_card(index).unwrap();
                    assert!(!state.cards.wagon_color(card).unwrap().is_locomotive());
                }
                other => assert_eq!(other, None),
            }
        }
    }

    #[test]
    fn ai_controller_selects_minimum_tickets() {
        let state = state();
        let mut context = TurnContext::new(2);
        context.pending_tickets.offered = [0, 1, 2]
            .into_iter()
            .map(crate::card::DestinationCardId)
            .collect();
        let view = ControllerView {
            state: &state,
            context: &context,
            phase: Phase::DestinationChoice,
            player: 0,
        };

        assert_eq!(
            AiController::new(1).next_command(&view),
            Some(Command::SelectDestination {
                indices: vec![1, 2]
            })
        );
    }
}
