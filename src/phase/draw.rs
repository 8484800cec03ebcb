use super::{Origin, Phase, Step, Steps};
use crate::card::WagonColor;
use crate::command::Command;
use crate::context::{DrawSource, TurnContext};
use crate::engine::{Engine, Parts};
use crate::error::GameError;
use crate::event::EngineEvent;
use crate::state::GameState;

use smallvec::SmallVec;

/// A wagon card draw that passed validation.
#[derive(Clone, Copy)]
enum Pick {
    FaceUp { index: usize, color: WagonColor },
    FaceDown,
}

impl Pick {
    fn source(&self) -> DrawSource {
        match self {
            Pick::FaceUp { .. } => DrawSource::FaceUp,
            Pick::FaceDown => DrawSource::FaceDown,
        }
    }
}

fn validate_draw(
    state: &GameState,
    context: &TurnContext,
    command: &Command,
) -> Result<Pick, GameError> {
    if context.draws_remaining == 0 {
        return Err(GameError::RuleViolation(String::from(
            "Cannot draw any more wagon cards this turn.",
        )));
    }

    let pick = match *command {
        Command::DrawFaceup { index } => {
            let color = state
                .cards
                .face_up_card(index)
                .and_then(|card| state.cards.wagon_color(card))
                .ok_or_else(|| {
                    GameError::InvalidPayload(format!("There is no face-up card at slot {}.", index))
                })?;

            if color.is_locomotive() && context.draws_remaining < 2 {
                return Err(GameError::RuleViolation(String::from(
                    "A face-up locomotive can only be drawn as the first card of a turn.",
                )));
            }
            Pick::FaceUp { index, color }
        }
        Command::DrawFacedown => {
            if !state.cards.can_draw_face_down() {
                return Err(GameError::RuleViolation(String::from(
                    "There are no wagon cards left to draw.",
                )));
            }
            Pick::FaceDown
        }
        _ => {
            return Err(GameError::InvalidPayload(format!(
                "`{}` does not draw a wagon card.",
                command
            )))
        }
    };

    if context.draw_source != DrawSource::None && context.draw_source != pick.source() {
        return Err(GameError::RuleViolation(String::from(
            "Cannot mix face-up and face-down draws in the same turn.",
        )));
    }

    Ok(pick)
}

/// Checks a wagon card draw without carrying it out.
pub(super) fn check_draw(
    state: &GameState,
    context: &TurnContext,
    command: &Command,
) -> Result<(), GameError> {
    validate_draw(state, context, command).map(|_| ())
}

/// Where a turn goes after a wagon card draw.
fn next_draw_phase(state: &GameState, context: &TurnContext) -> Phase {
    if context.draws_remaining == 0 {
        return Phase::Confirmation;
    }

    match context.draw_source {
        DrawSource::FaceUp if state.cards.can_draw_face_up_again() => Phase::FaceUp,
        DrawSource::FaceDown if state.cards.can_draw_face_down() => Phase::FaceDown,
        _ => Phase::Confirmation,
    }
}

pub(super) fn draw_wagon(engine: &mut Engine, command: &Command) -> Result<Steps, GameError> {
    let Parts {
        state,
        context,
        events,
    } = engine.parts()?;

    let pick = validate_draw(state, context, command)?;
    let player = state
        .players
        .get_mut(context.current_player)
        .ok_or(GameError::MissingState("player"))?;

    match pick {
        Pick::FaceUp { index, color } => {
            let (_, reset) = state
                .cards
                .draw_face_up(index, &mut player.hand.wagons)
                .ok_or_else(|| {
                    GameError::InvalidPayload(format!("There is no face-up card at slot {}.", index))
                })?;

            events.push(EngineEvent::info(format!(
                "{} took a {} card from the face-up row.",
                player.name, color
            )));
            if reset {
                events.push(EngineEvent::info(format!(
                    "Too many locomotives were face up: the row was replaced with {}.",
                    state
                        .cards
                        .face_up_colors()
                        .iter()
                        .map(|color| color.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }

            // A face-up locomotive is the only card of the turn.
            context.draws_remaining = if color.is_locomotive() {
                0
            } else {
                context.draws_remaining - 1
            };
        }
        Pick::FaceDown => {
            state.cards.draw_face_down(&mut player.hand.wagons, 1);
            events.push(EngineEvent::info(format!(
                "{} drew a card from the deck.",
                player.name
            )));
            context.draws_remaining -= 1;
        }
    }
    context.draw_source = pick.source();

    Ok(smallvec![Step::Enter(next_draw_phase(state, context))])
}

/// Non-human players pick their second card on their own.
pub(super) fn auto_draw(engine: &mut Engine, phase: Phase) -> Result<Steps, GameError> {
    let player = engine.context.current_player;
    if !engine.is_ai(player) {
        return Ok(SmallVec::new());
    }

    match engine.ask_controller(phase) {
        Some(command) => Ok(smallvec![Step::Dispatch {
            command,
            origin: Origin::Controller(player),
        }]),
        None => Ok(smallvec![Step::Enter(Phase::Confirmation)]),
    }
}

pub(super) fn offer_destinations(engine: &mut Engine) -> Result<Steps, GameError> {
    let Parts {
        state,
        context,
        events,
    } = engine.parts()?;

    let offered = state.cards.draw_destinations(state.config.destination_offer);
    let player = state.player(context.current_player)?;

    if offered.is_empty() {
        events.push(EngineEvent::info(
            "There are no destination tickets left to draw.",
        ));
        return Ok(smallvec![Step::Enter(Phase::Confirmation)]);
    }

    events.push(EngineEvent::info(format!(
        "{} drew {} destination tickets.",
        player.name,
        offered.len()
    )));
    for (position, id) in offered.iter().enumerate() {
        if let Some(ticket) = state.cards.destination(*id) {
            events.push(EngineEvent::info(format!(
                "{}. {} - {} ({} points)",
                position + 1,
                state.map.station_name(ticket.destination.0),
                state.map.station_name(ticket.destination.1),
                ticket.points
            )));
        }
    }

    context.pending_tickets.offered = offered;
    Ok(smallvec![Step::Enter(Phase::DestinationChoice)])
}

/// Non-human players keep the first tickets on offer, as few as allowed.
pub(super) fn auto_select(engine: &mut Engine) -> Result<Steps, GameError> {
    let player = engine.context.current_player;
    if !engine.is_ai(player) {
        return Ok(SmallVec::new());
    }

    let context = &engine.context;
    let keep = context
        .min_keep_tickets
        .min(context.pending_tickets.offered.len());

    Ok(smallvec![Step::Dispatch {
        command: Command::SelectDestination {
            indices: (1..=keep).collect(),
        },
        origin: Origin::Controller(player),
    }])
}

pub(super) fn select_destinations(
    engine: &mut Engine,
    indices: &[usize],
) -> Result<Steps, GameError> {
    let Parts {
        state,
        context,
        events,
    } = engine.parts()?;

    let num_offered = context.pending_tickets.offered.len();
    if num_offered == 0 {
        return Err(GameError::MissingState("destination ticket offer"));
    }

    for (position, index) in indices.iter().enumerate() {
        if *index == 0 || *index > num_offered {
            return Err(GameError::InvalidPayload(format!(
                "Ticket {} is not on offer: pick between 1 and {}.",
                index, num_offered
            )));
        }
        if indices[..position].contains(index) {
            return Err(GameError::InvalidPayload(format!(
                "Ticket {} was picked more than once.",
                index
            )));
        }
    }

    let required = context.min_keep_tickets.min(num_offered);
    if indices.len() < required {
        return Err(GameError::RuleViolation(format!(
            "Must keep at least {} of the {} destination tickets.",
            required, num_offered
        )));
    }

    let player = state
        .players
        .get_mut(context.current_player)
        .ok_or(GameError::MissingState("player"))?;

    let offered = std::mem::take(&mut context.pending_tickets.offered);
    for (position, ticket) in offered.into_iter().enumerate() {
        if indices.contains(&(position + 1)) {
            player.hand.destinations.add_card(ticket);
        } else {
            state.cards.return_destination(ticket);
        }
    }

    events.push(EngineEvent::info(format!(
        "{} kept {} of {} destination tickets.",
        player.name,
        indices.len(),
        num_offered
    )));

    Ok(smallvec![Step::Enter(Phase::Confirmation)])
}

/// Tickets still on offer go back under the pile.
pub(super) fn return_offers(engine: &mut Engine) {
    if let Ok(Parts { state, context, .. }) = engine.parts() {
        for ticket in std::mem::take(&mut context.pending_tickets.offered) {
            state.cards.return_destination(ticket);
        }
    }
}
