use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info_span, warn};
use uuid::Uuid;

use crate::engine::GameEngine;
use crate::game::action::GameAction;
use crate::game::{GameConfig, GameError, GamePhase, GameState};
use crate::players::BasePlayer;

pub const TURNS_LIMIT: u32 = 10_000;

/// Engine object: owns the authoritative state and the RNG that shuffles
/// the deck, so a game is reproducible from its seed.
pub struct Game {
    pub seed: u64,
    pub id: Uuid,
    pub ticks: u32,
    state: Option<GameState>,
    rng: StdRng,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let state = GameState::new(&config, &mut rng);
        Self {
            seed: config.seed,
            id: Uuid::new_v4(),
            ticks: 0,
            state: Some(state),
            rng,
        }
    }

    /// Engine without a state; call `set_state` before playing.
    pub fn uninitialized(seed: u64) -> Self {
        Self {
            seed,
            id: Uuid::new_v4(),
            ticks: 0,
            state: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    fn state_ref(&self) -> Result<&GameState, GameError> {
        self.state.as_ref().ok_or(GameError::StateNotInitialized)
    }

    pub fn is_finished(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.phase == GamePhase::Finished)
    }

    /// Run the game until a team wins or the tick limit is hit.
    pub fn play<P: BasePlayer<Self>>(&mut self, players: &[P]) -> Option<[usize; 2]> {
        let span = info_span!("game", id = %self.id, seed = self.seed);
        let _guard = span.enter();
        while !self.is_finished() && self.ticks < TURNS_LIMIT {
            if self.play_tick(players).is_err() {
                break;
            }
        }
        self.winning_team()
    }

    /// Let the active seat choose one action and apply it. An empty action
    /// list or a `None` choice is a pass.
    pub fn play_tick<P: BasePlayer<Self>>(
        &mut self,
        players: &[P],
    ) -> Result<Option<GameAction>, GameError> {
        let seat = self.state_ref()?.idx_player_active;
        let player = players.get(seat).ok_or(GameError::InvalidPlayer(seat))?;

        let actions = self.get_list_action()?;
        let view = self.get_player_view(seat)?;
        let choice = if actions.is_empty() {
            None
        } else {
            player.decide(&view, &actions)
        };

        self.ticks += 1;
        match self.apply_action(choice) {
            Ok(()) => Ok(choice),
            Err(err) => {
                warn!(seat, ?choice, %err, "action rejected, passing instead");
                self.apply_action(None)?;
                Ok(None)
            }
        }
    }

    pub fn winning_team(&self) -> Option<[usize; 2]> {
        self.state.as_ref().and_then(GameState::winning_team)
    }

    pub fn copy(&self) -> Self {
        Self {
            seed: self.seed,
            id: self.id,
            ticks: self.ticks,
            state: self.state.clone(),
            rng: self.rng.clone(),
        }
    }
}

impl GameEngine for Game {
    type State = GameState;
    type Action = GameAction;
    type Error = GameError;

    fn get_state(&self) -> Result<GameState, GameError> {
        self.state_ref().cloned()
    }

    fn set_state(&mut self, state: GameState) {
        debug!(id = %self.id, round = state.round, "state replaced");
        self.state = Some(state);
    }

    fn get_list_action(&self) -> Result<Vec<GameAction>, GameError> {
        Ok(self.state_ref()?.legal_actions())
    }

    fn apply_action(&mut self, action: Option<GameAction>) -> Result<(), GameError> {
        let state = self.state.as_mut().ok_or(GameError::StateNotInitialized)?;
        state.apply(action, &mut self.rng)
    }

    fn get_player_view(&self, seat: usize) -> Result<GameState, GameError> {
        self.state_ref()?.player_view(seat)
    }
}
