use super::{claim, draw, Origin, Phase, Step, Steps};
use crate::card::DestinationCardId;
use crate::command::Command;
use crate::engine::{Engine, Parts};
use crate::error::GameError;
use crate::event::EngineEvent;
use crate::state::GameState;

use log::info;
use smallvec::SmallVec;

pub(super) fn setup(engine: &mut Engine) -> Result<Steps, GameError> {
    let Parts {
        state,
        context,
        events,
    } = engine.parts()?;

    if !state.dealt {
        state.deal();
        context.reset(state.config.min_keep_tickets);
        events.push(EngineEvent::info(format!(
            "A new game begins with {} players.",
            state.party_size()
        )));
        info!("New game with {} players.", state.party_size());
    }

    Ok(smallvec![Step::Enter(Phase::PlayerAnnounce)])
}

pub(super) fn announce(engine: &mut Engine) -> Result<Steps, GameError> {
    // A resumed game may still hold cards of an unfinished turn.
    draw::return_offers(engine);
    claim::discard_revealed(engine);

    let Parts {
        state,
        context,
        events,
    } = engine.parts()?;

    let player = state.player(context.current_player)?;
    context.begin_turn();
    events.push(EngineEvent::info(format!("It is {}'s turn.", player.name)));

    Ok(smallvec![Step::Enter(Phase::PlayerTurn)])
}

pub(super) fn wait(engine: &mut Engine) -> Result<Steps, GameError> {
    let Parts {
        state,
        context,
        events,
    } = engine.parts()?;

    let player = state.player(context.current_player)?;
    events.push(EngineEvent::info(format!(
        "Waiting for {} to play.",
        player.name
    )));

    Ok(smallvec![Step::Enter(Phase::PlayerAnnounce)])
}

/// Non-human players pick their action as soon as their turn starts.
pub(super) fn auto_play(engine: &mut Engine) -> Result<Steps, GameError> {
    let player = engine.context.current_player;
    if !engine.is_ai(player) {
        return Ok(SmallVec::new());
    }

    match engine.ask_controller(Phase::PlayerTurn) {
        Some(command) => Ok(smallvec![Step::Dispatch {
            command,
            origin: Origin::Controller(player),
        }]),
        None => Ok(smallvec![Step::Enter(Phase::Confirmation)]),
    }
}

/// Validates the action picked for the turn, then forwards it to the phase that carries it out.
pub(super) fn take_action(
    engine: &mut Engine,
    command: Command,
    origin: Origin,
) -> Result<Steps, GameError> {
    let player = engine.context.current_player;
    let state = engine.state()?;

    let next = match &command {
        Command::DrawFaceup { .. } | Command::DrawFacedown => {
            draw::check_draw(state, &engine.context, &command)?;
            Phase::DrawWagon
        }
        Command::DrawDestination => {
            if state.cards.count_destinations() == 0 {
                return Err(GameError::RuleViolation(String::from(
                    "There are no destination tickets left to draw.",
                )));
            }
            return Ok(smallvec![Step::Enter(Phase::DrawDestination)]);
        }
        Command::TakeRoad { road, color } => {
            claim::plan_road(state, player, *road, *color)?;
            Phase::ClaimRoad
        }
        Command::ClaimStation { station, color } => {
            claim::plan_station(state, player, station, *color)?;
            Phase::ClaimStation
        }
        Command::BorrowRoad { road } => {
            claim::check_borrow(state, player, *road)?;
            Phase::BorrowRoad
        }
        _ => {
            return Err(GameError::IllegalCommand {
                command: command.kind(),
                phase: Phase::PlayerTurn,
            })
        }
    };

    Ok(smallvec![
        Step::Enter(next),
        Step::Dispatch { command, origin }
    ])
}

/// Non-human players confirm the end of their turn straight away.
pub(super) fn auto_confirm(engine: &mut Engine) -> Result<Steps, GameError> {
    let player = engine.context.current_player;
    if !engine.is_ai(player) {
        return Ok(SmallVec::new());
    }

    Ok(smallvec![
        Step::Dispatch {
            command: Command::ConfirmEndTurn,
            origin: Origin::Controller(player),
        },
        Step::EnterIfStill {
            expected: Phase::Confirmation,
            turn_serial: engine.context.turn_serial,
            next: Phase::EndTurn,
        }
    ])
}

fn describe_destination(state: &GameState, id: DestinationCardId) -> String {
    match state.cards.destination(id) {
        Some(ticket) => format!(
            "{} - {} ({} points)",
            state.map.station_name(ticket.destination.0),
            state.map.station_name(ticket.destination.1),
            ticket.points
        ),
        None => format!("ticket {}", id),
    }
}

fn complete_destinations(state: &mut GameState, player: usize, events: &mut Vec<EngineEvent>) {
    for id in state.complete_destinations(player) {
        let description = describe_destination(state, id);
        if let Some(current) = state.players.get(player) {
            events.push(EngineEvent::info(format!(
                "{} completed {}.",
                current.name, description
            )));
        }
    }
}

pub(super) fn end_turn(engine: &mut Engine) -> Result<Steps, GameError> {
    let Parts {
        state,
        context,
        events,
    } = engine.parts()?;

    let current = context.current_player;
    complete_destinations(state, current, events);

    let player = state.player(current)?;
    if !context.final_round && player.wagons <= state.config.final_round_wagons {
        context.final_round = true;
        context.final_round_starter = Some(current);
        events.push(EngineEvent::info(format!(
            "{} has {} wagons left: this is the final round!",
            player.name, player.wagons
        )));
        info!("Final round started by {}.", player.name);
    }

    let next = (current + 1) % state.party_size();
    context.current_player = next;

    if context.final_round && context.final_round_starter == Some(next) {
        Ok(smallvec![Step::Enter(Phase::EndGame)])
    } else {
        Ok(smallvec![Step::Enter(Phase::PlayerAnnounce)])
    }
}

pub(super) fn end_game(engine: &mut Engine) -> Result<Steps, GameError> {
    let Parts { state, events, .. } = engine.parts()?;

    for player in 0..state.party_size() {
        complete_destinations(state, player, events);
    }

    for score in state.final_scores() {
        let player = state.player(score.player)?;
        events.push(EngineEvent::info(format!(
            "{}: {} points ({} from roads, {} from destination tickets, {} from stations).",
            player.name, score.total, score.score, score.destinations, score.wagon_points
        )));
        info!("{} ends the game with {} points.", player.name, score.total);
    }

    if let Some(winner) = state.winner() {
        let player = state.player(winner.player)?;
        events.push(EngineEvent::info(format!(
            "{} wins with {} points!",
            player.name, winner.total
        )));
    }

    Ok(SmallVec::new())
}
