use crate::command::{Command, CommandType};
use crate::engine::Engine;
use crate::error::GameError;
use crate::event::EngineEvent;

use log::debug;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum_macros::{Display, EnumIter};

pub(crate) mod claim;
mod draw;
mod turn;

const IDLE_COMMANDS: &[CommandType] = &[CommandType::Exit, CommandType::Help];
const PLAYER_TURN_COMMANDS: &[CommandType] = &[
    CommandType::DrawDestination,
    CommandType::DrawFaceup,
    CommandType::DrawFacedown,
    CommandType::TakeRoad,
    CommandType::BorrowRoad,
    CommandType::ClaimStation,
    CommandType::Exit,
    CommandType::Help,
];
const DRAW_WAGON_COMMANDS: &[CommandType] = &[
    CommandType::DrawFaceup,
    CommandType::DrawFacedown,
    CommandType::Exit,
    CommandType::Help,
];
const FACE_UP_COMMANDS: &[CommandType] =
    &[CommandType::DrawFaceup, CommandType::Exit, CommandType::Help];
const FACE_DOWN_COMMANDS: &[CommandType] =
    &[CommandType::DrawFacedown, CommandType::Exit, CommandType::Help];
const DESTINATION_CHOICE_COMMANDS: &[CommandType] = &[
    CommandType::SelectDestination,
    CommandType::Exit,
    CommandType::Help,
];
const CLAIM_ROAD_COMMANDS: &[CommandType] =
    &[CommandType::TakeRoad, CommandType::Exit, CommandType::Help];
const CLAIM_STATION_COMMANDS: &[CommandType] =
    &[CommandType::ClaimStation, CommandType::Exit, CommandType::Help];
const BORROW_ROAD_COMMANDS: &[CommandType] =
    &[CommandType::BorrowRoad, CommandType::Exit, CommandType::Help];
const CONFIRMATION_COMMANDS: &[CommandType] = &[
    CommandType::ConfirmEndTurn,
    CommandType::BorrowRoad,
    CommandType::Exit,
    CommandType::Help,
];

/// Every phase a game goes through. Exactly one is active at a time.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// Shuffles and deals starting hands.
    Setup,
    /// Announces whose turn it is.
    PlayerAnnounce,
    /// Idles, then re-announces the current player.
    WaitTurn,
    /// The player picks their action for the turn.
    PlayerTurn,
    /// First wagon card draw of the turn.
    DrawWagon,
    /// Second draw, from the face-up row.
    FaceUp,
    /// Second draw, from the face-down pile.
    FaceDown,
    DrawDestination,
    DestinationChoice,
    ClaimRoad,
    TunnelResolve,
    ClaimStation,
    BorrowRoad,
    /// The turn is over once the player confirms it.
    Confirmation,
    EndTurn,
    EndGame,
    /// Terminal: the engine tears itself down.
    Exit,
}

impl Phase {
    /// Command kinds accepted during this phase.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_europe::command::CommandType;
    /// use ticket_to_ride_europe::phase::Phase;
    ///
    /// assert!(Phase::Confirmation.allows(CommandType::BorrowRoad));
    /// assert!(!Phase::Confirmation.allows(CommandType::TakeRoad));
    /// assert!(Phase::Exit.allowed_commands().is_empty());
    /// ```
    pub fn allowed_commands(&self) -> &'static [CommandType] {
        match self {
            Phase::PlayerTurn => PLAYER_TURN_COMMANDS,
            Phase::DrawWagon => DRAW_WAGON_COMMANDS,
            Phase::FaceUp => FACE_UP_COMMANDS,
            Phase::FaceDown => FACE_DOWN_COMMANDS,
            Phase::DestinationChoice => DESTINATION_CHOICE_COMMANDS,
            Phase::ClaimRoad => CLAIM_ROAD_COMMANDS,
            Phase::ClaimStation => CLAIM_STATION_COMMANDS,
            Phase::BorrowRoad => BORROW_ROAD_COMMANDS,
            Phase::Confirmation => CONFIRMATION_COMMANDS,
            Phase::Exit => &[],
            Phase::Setup
            | Phase::PlayerAnnounce
            | Phase::WaitTurn
            | Phase::DrawDestination
            | Phase::TunnelResolve
            | Phase::EndTurn
            | Phase::EndGame => IDLE_COMMANDS,
        }
    }

    #[inline]
    pub fn allows(&self, command: CommandType) -> bool {
        self.allowed_commands().contains(&command)
    }

    /// Phases in which the current player is in the middle of their action.
    pub fn is_mid_turn(&self) -> bool {
        matches!(
            self,
            Phase::PlayerTurn
                | Phase::DrawWagon
                | Phase::FaceUp
                | Phase::FaceDown
                | Phase::DrawDestination
                | Phase::DestinationChoice
                | Phase::ClaimRoad
                | Phase::TunnelResolve
                | Phase::ClaimStation
                | Phase::BorrowRoad
        )
    }

    pub(crate) fn on_enter(self, engine: &mut Engine) -> Result<Steps, GameError> {
        match self {
            Phase::Setup => turn::setup(engine),
            Phase::PlayerAnnounce => turn::announce(engine),
            Phase::WaitTurn => turn::wait(engine),
            Phase::PlayerTurn => turn::auto_play(engine),
            Phase::FaceUp | Phase::FaceDown => draw::auto_draw(engine, self),
            Phase::DrawDestination => draw::offer_destinations(engine),
            Phase::DestinationChoice => draw::auto_select(engine),
            Phase::TunnelResolve => claim::resolve_tunnel(engine),
            Phase::Confirmation => turn::auto_confirm(engine),
            Phase::EndTurn => turn::end_turn(engine),
            Phase::EndGame => turn::end_game(engine),
            Phase::Exit => Ok(smallvec![Step::Teardown]),
            Phase::DrawWagon | Phase::ClaimRoad | Phase::ClaimStation | Phase::BorrowRoad => {
                Ok(SmallVec::new())
            }
        }
    }

    pub(crate) fn handle(
        self,
        engine: &mut Engine,
        command: Command,
        origin: Origin,
    ) -> Result<Steps, GameError> {
        match (self, command) {
            (_, Command::Exit) => Ok(smallvec![Step::Enter(Phase::Exit)]),
            (_, Command::Help) => help(engine, self),
            (Phase::PlayerTurn, command) => turn::take_action(engine, command, origin),
            (Phase::DrawWagon | Phase::FaceUp | Phase::FaceDown, command) => {
                draw::draw_wagon(engine, &command)
            }
            (Phase::DestinationChoice, Command::SelectDestination { indices }) => {
                draw::select_destinations(engine, &indices)
            }
            (Phase::ClaimRoad, Command::TakeRoad { road, color }) => {
                claim::take_road(engine, road, color)
            }
            (Phase::ClaimStation, Command::ClaimStation { station, color }) => {
                claim::claim_station(engine, &station, color)
            }
            (Phase::BorrowRoad, Command::BorrowRoad { road }) => claim::borrow_road(engine, road),
            (Phase::Confirmation, Command::BorrowRoad { road }) => {
                claim::forward_borrow(engine, road, origin)
            }
            (Phase::Confirmation, Command::ConfirmEndTurn) => {
                Ok(smallvec![Step::Enter(Phase::EndTurn)])
            }
            (phase, command) => Err(GameError::IllegalCommand {
                command: command.kind(),
                phase,
            }),
        }
    }

    pub(crate) fn on_exit(self, engine: &mut Engine) {
        match self {
            Phase::DestinationChoice => draw::return_offers(engine),
            Phase::TunnelResolve => claim::discard_revealed(engine),
            _ => {}
        }
    }
}

fn help(engine: &mut Engine, phase: Phase) -> Result<Steps, GameError> {
    let allowed: Vec<_> = phase
        .allowed_commands()
        .iter()
        .map(|command| command.to_string())
        .collect();
    engine.emit(EngineEvent::info(format!(
        "Allowed commands: {}.",
        allowed.join(", ")
    )));

    if phase == Phase::PlayerTurn {
        Ok(smallvec![Step::Enter(Phase::WaitTurn)])
    } else {
        Ok(SmallVec::new())
    }
}

/// Who sent a command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Origin {
    /// The caller of [`Engine::handle_command`].
    Caller,
    /// The controller of the given seat, during a cascade.
    Controller(usize),
}

/// One unit of work of the engine's cascade.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Step {
    Enter(Phase),
    Dispatch { command: Command, origin: Origin },
    /// Enters `next` only if the machine still sits in `expected`, during the same turn.
    EnterIfStill {
        expected: Phase,
        turn_serial: u64,
        next: Phase,
    },
    /// Drops the game state and the state machine.
    Teardown,
}

/// Follow-up steps, run in order before anything queued earlier.
pub(crate) type Steps = SmallVec<[Step; 2]>;

/// Holds the active phase.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StateMachine {
    current: Option<Phase>,
}

impl StateMachine {
    #[inline]
    pub fn current(&self) -> Option<Phase> {
        self.current
    }

    /// Leaves the current phase (if any), then enters `next`.
    ///
    /// Returns the follow-up steps `next` asked for on entry.
    pub(crate) fn transition_to(engine: &mut Engine, next: Phase) -> Result<Steps, GameError> {
        let previous = engine
            .machine
            .ok_or(GameError::MissingState("state machine"))?
            .current;

        if let Some(previous) = previous {
            previous.on_exit(engine);
        }
        if let Some(machine) = engine.machine.as_mut() {
            machine.current = Some(next);
        }

        match previous {
            Some(previous) => debug!("Phase {} -> {}.", previous, next),
            None => debug!("Phase -> {}.", next),
        }
        next.on_enter(engine)
    }

    /// Hands `command` over to the current phase, provided it accepts that kind of command.
    pub(crate) fn handle_command(
        engine: &mut Engine,
        command: Command,
        origin: Origin,
    ) -> Result<Steps, GameError> {
        let phase = engine
            .machine
            .ok_or(GameError::MissingState("state machine"))?
            .current
            .ok_or(GameError::MissingState("active phase"))?;

        if !phase.allows(command.kind()) {
            return Err(GameError::IllegalCommand {
                command: command.kind(),
                phase,
            });
        }

        debug!("Dispatching `{}` during the {} phase.", command, phase);
        phase.handle(engine, command, origin)
    }
}
