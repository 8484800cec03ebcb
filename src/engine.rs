use crate::command::{Command, CommandType};
use crate::config::GameConfig;
use crate::context::TurnContext;
use crate::controller::{Controller, ControllerView};
use crate::error::GameError;
use crate::event::{EngineEvent, EngineResult};
use crate::phase::{Origin, Phase, StateMachine, Step, Steps};
use crate::state::{default_player_names, GameState};

use log::{info, warn};
use std::collections::VecDeque;

/// Split borrows of the engine, handed to phases.
pub(crate) struct Parts<'a> {
    pub state: &'a mut GameState,
    pub context: &'a mut TurnContext,
    pub events: &'a mut Vec<EngineEvent>,
}

/// Owns a game, and runs commands against it.
///
/// Every command is processed to completion before the call returns, including the moves that
/// non-human players make along the way.
pub struct Engine {
    pub(crate) state: Option<GameState>,
    pub(crate) machine: Option<StateMachine>,
    pub(crate) context: TurnContext,
    pub(crate) controllers: Vec<Box<dyn Controller>>,
    /// Events of the command being processed.
    pub(crate) events: Vec<EngineEvent>,
}

impl Engine {
    /// Returns an `Err` if there is not exactly one controller per player.
    pub fn new(
        state: GameState,
        controllers: Vec<Box<dyn Controller>>,
    ) -> Result<Self, GameError> {
        if controllers.len() != state.party_size() {
            return Err(GameError::InvalidPayload(format!(
                "Expected {} controllers, one per player, but got {}.",
                state.party_size(),
                controllers.len()
            )));
        }

        Ok(Self {
            context: TurnContext::new(state.config.min_keep_tickets),
            state: Some(state),
            machine: Some(StateMachine::default()),
            controllers,
            events: Vec::new(),
        })
    }

    /// A fresh game on the Europe board, with one player per controller named `Player1`,
    /// `Player2`, ...
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride_europe::config::GameConfig;
    /// use ticket_to_ride_europe::controller::{Controller, HumanController};
    /// use ticket_to_ride_europe::engine::Engine;
    /// use ticket_to_ride_europe::phase::Phase;
    ///
    /// let controllers: Vec<Box<dyn Controller>> =
    ///     vec![Box::new(HumanController), Box::new(HumanController)];
    /// let mut engine = Engine::with_europe_board(controllers, GameConfig::default(), 42).unwrap();
    ///
    /// let result = engine.start();
    /// assert!(result.ok);
    /// assert_eq!(result.next_phase, Some(Phase::PlayerTurn));
    /// ```
    pub fn with_europe_board(
        controllers: Vec<Box<dyn Controller>>,
        config: GameConfig,
        seed: u64,
    ) -> Result<Self, GameError> {
        let state = GameState::europe(default_player_names(controllers.len()), config, seed)?;
        Self::new(state, controllers)
    }

    /// Replaces the turn context, e.g. when resuming a saved game.
    pub fn with_context(mut self, context: TurnContext) -> Self {
        self.context = context;
        self
    }

    /// Enters the setup phase, which deals cards (unless already dealt) and starts the first turn.
    pub fn start(&mut self) -> EngineResult {
        if self.machine.is_none() {
            return self.fail(&GameError::MissingState("state machine"));
        }
        self.run(Step::Enter(Phase::Setup))
    }

    /// Runs a command on behalf of the current player.
    pub fn handle_command(&mut self, command: Command) -> EngineResult {
        if self.machine.is_none() {
            return self.fail(&GameError::MissingState("state machine"));
        }
        self.run(Step::Dispatch {
            command,
            origin: Origin::Caller,
        })
    }

    /// Asks the current player's controller for a command, and runs it.
    ///
    /// Returns `None` if the current player is human, or has nothing to play.
    pub fn step(&mut self) -> Option<EngineResult> {
        let phase = self.phase()?;
        let player = self.context.current_player;
        if !self.is_ai(player) {
            return None;
        }

        let command = self.ask_controller(phase)?;
        Some(self.run(Step::Dispatch {
            command,
            origin: Origin::Controller(player),
        }))
    }

    /// The active phase. `None` before the game starts, and after it is torn down.
    pub fn phase(&self) -> Option<Phase> {
        self.machine.and_then(|machine| machine.current())
    }

    /// Command kinds the active phase accepts.
    pub fn allowed_commands(&self) -> &'static [CommandType] {
        match self.phase() {
            Some(phase) => phase.allowed_commands(),
            None => &[],
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.machine.is_some()
    }

    pub fn state(&self) -> Result<&GameState, GameError> {
        self.state.as_ref().ok_or(GameError::MissingState("game state"))
    }

    /// Mutable accessor to the game state.
    ///
    /// Should only be used for testing!
    pub fn state_mut(&mut self) -> Result<&mut GameState, GameError> {
        self.state.as_mut().ok_or(GameError::MissingState("game state"))
    }

    #[inline]
    pub fn context(&self) -> &TurnContext {
        &self.context
    }

    /// Mutable accessor to the turn context.
    ///
    /// Should only be used for testing!
    pub fn context_mut(&mut self) -> &mut TurnContext {
        &mut self.context
    }

    pub(crate) fn parts(&mut self) -> Result<Parts<'_>, GameError> {
        let state = self
            .state
            .as_mut()
            .ok_or(GameError::MissingState("game state"))?;

        Ok(Parts {
            state,
            context: &mut self.context,
            events: &mut self.events,
        })
    }

    pub(crate) fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Whether a seat is played by a non-human controller.
    pub(crate) fn is_ai(&self, player: usize) -> bool {
        self.controllers
            .get(player)
            .map_or(false, |controller| !controller.is_human())
    }

    /// Asks the current player's controller what to play during `phase`.
    pub(crate) fn ask_controller(&mut self, phase: Phase) -> Option<Command> {
        let player = self.context.current_player;
        let state = self.state.as_ref()?;
        let controller = self.controllers.get_mut(player)?;

        controller.next_command(&ControllerView {
            state,
            context: &self.context,
            phase,
            player,
        })
    }

    fn player_name(&self, player: usize) -> String {
        self.state
            .as_ref()
            .and_then(|state| state.players.get(player))
            .map_or_else(|| format!("#{}", player), |player| player.name.clone())
    }

    fn reject(&mut self, error: &GameError) {
        warn!("Rejected command ({}): {}", error.category(), error);
        self.events.push(EngineEvent::error(error.to_string()));
    }

    fn fail(&mut self, error: &GameError) -> EngineResult {
        warn!("Rejected command ({}): {}", error.category(), error);
        let result = EngineResult::failure(error, self.phase());
        self.notify(&result);
        result
    }

    fn notify(&mut self, result: &EngineResult) {
        for controller in &mut self.controllers {
            controller.notify(result);
        }
    }

    /// Steps to take after a non-human player sent a command that got rejected.
    fn fallback(&self) -> Steps {
        match self.phase() {
            Some(phase) if phase.is_mid_turn() => smallvec![Step::Enter(Phase::Confirmation)],
            _ => Steps::new(),
        }
    }

    /// Runs `first`, then every step it leads to, depth first.
    ///
    /// Stops after `max_cascade_steps` steps. Every step is atomic, so the game state stays
    /// consistent even then.
    fn run(&mut self, first: Step) -> EngineResult {
        let max_steps = self
            .state
            .as_ref()
            .map_or(GameConfig::default().max_cascade_steps, |state| {
                state.config.max_cascade_steps
            });

        let mut result = EngineResult {
            ok: true,
            ..EngineResult::default()
        };
        let mut steps = VecDeque::from([first]);
        let mut num_steps = 0;

        while let Some(step) = steps.pop_front() {
            num_steps += 1;
            if num_steps > max_steps {
                warn!(
                    "Dropped {} pending steps after running {}.",
                    steps.len() + 1,
                    max_steps
                );
                self.events.push(EngineEvent::error(format!(
                    "Stopped after {} automatic steps.",
                    max_steps
                )));
                break;
            }

            match step {
                Step::Enter(phase) => match StateMachine::transition_to(self, phase) {
                    Ok(next) => schedule(&mut steps, next),
                    Err(error) => self.reject(&error),
                },
                Step::Dispatch { command, origin } => {
                    if let Origin::Controller(player) = origin {
                        let name = self.player_name(player);
                        self.events
                            .push(EngineEvent::info(format!("AI {}: {}", name, command)));
                    }

                    match StateMachine::handle_command(self, command, origin) {
                        Ok(next) => schedule(&mut steps, next),
                        Err(error) => {
                            self.reject(&error);
                            match origin {
                                Origin::Caller => {
                                    result.ok = false;
                                    if result.error.is_none() {
                                        result.error = Some(error.to_string());
                                    }
                                }
                                Origin::Controller(_) => schedule(&mut steps, self.fallback()),
                            }
                        }
                    }
                }
                Step::EnterIfStill {
                    expected,
                    turn_serial,
                    next,
                } => {
                    if self.phase() == Some(expected) && self.context.turn_serial == turn_serial {
                        steps.push_front(Step::Enter(next));
                    }
                }
                Step::Teardown => {
                    self.state = None;
                    self.machine = None;
                    steps.clear();
                    info!("Engine torn down.");
                }
            }
        }

        result.next_phase = self.phase();
        result.events = std::mem::take(&mut self.events);
        self.notify(&result);
        result
    }
}

/// Queues `next` ahead of everything else, keeping its order.
fn schedule(steps: &mut VecDeque<Step>, next: Steps) {
    for step in next.into_iter().rev() {
        steps.push_front(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::HumanController;

    fn humans(num_players: usize) -> Vec<Box<dyn Controller>> {
        (0..num_players)
            .map(|_| Box::new(HumanController) as Box<dyn Controller>)
            .collect()
    }

    #[test]
    fn engine_needs_one_controller_per_player() {
        let state = GameState::europe(default_player_names(3), GameConfig::default(), 1).unwrap();
        assert!(matches!(
            Engine::new(state, humans(2)),
            Err(GameError::InvalidPayload(_))
        ));
    }

    #[test]
    fn engine_not_started() {
        let mut engine = Engine::with_europe_board(humans(2), GameConfig::default(), 1).unwrap();
        assert_eq!(engine.phase(), None);
        assert!(engine.allowed_commands().is_empty());

        let result = engine.handle_command(Command::DrawFacedown);
        assert!(!result.ok);
        assert_eq!(
            result.error.as_deref(),
            Some("The engine has no active phase.")
        );
        assert_eq!(result.events.len(), 1);
        assert!(result.events[0].is_error());
    }

    #[test]
    fn engine_start() {
        let mut engine = Engine::with_europe_board(humans(2), GameConfig::default(), 1).unwrap();
        let result = engine.start();

        assert!(result.ok);
        assert_eq!(result.next_phase, Some(Phase::PlayerTurn));
        assert!(result.messages().any(|message| message == "It is Player1's turn."));
        assert_eq!(engine.context().turn_serial, 1);
        assert!(engine.state().unwrap().dealt);
        assert!(engine.step().is_none());
    }

    #[test]
    fn engine_illegal_command() {
        let mut engine = Engine::with_europe_board(humans(2), GameConfig::default(), 1).unwrap();
        engine.start();

        let result = engine.handle_command(Command::ConfirmEndTurn);
        assert!(!result.ok);
        assert_eq!(
            result.error.as_deref(),
            Some("Command `confirm-end-turn` is not allowed during the player_turn phase.")
        );
        assert_eq!(result.next_phase, Some(Phase::PlayerTurn));
    }

    #[test]
    fn engine_exit() {
        let mut engine = Engine::with_europe_board(humans(2), GameConfig::default(), 1).unwrap();
        engine.start();

        let result = engine.handle_command(Command::Exit);
        assert!(result.ok);
        assert_eq!(result.next_phase, None);
        assert!(!engine.is_running());
        assert!(engine.state().is_err());

        let result = engine.handle_command(Command::Help);
        assert!(!result.ok);
        assert_eq!(
            result.error.as_deref(),
            Some("The engine has no state machine.")
        );
        assert_eq!(result.events.len(), 1);
        assert!(!engine.start().ok);
    }

    #[test]
    fn engine_help() {
        let mut engine = Engine::with_europe_board(humans(2), GameConfig::default(), 1).unwrap();
        engine.start();

        let result = engine.handle_command(Command::Help);
        assert!(result.ok);
        assert_eq!(
            result.events[0].message,
            "Allowed commands: draw-destination, draw-faceup, draw-facedown, take-road, \
             borrow-road, claim-station, exit, help."
        );
        assert!(result
            .messages()
            .any(|message| message == "Waiting for Player1 to play."));
        assert_eq!(result.next_phase, Some(Phase::PlayerTurn));
        assert_eq!(engine.context().current_player, 0);
    }
}
