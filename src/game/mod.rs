pub mod action;
pub mod cards;
pub mod game;
pub mod legal;
pub mod players;
pub mod special;
pub mod state;

pub use action::GameAction;
pub use cards::{Card, DECK_SIZE};
pub use game::Game;
pub use players::{Marble, PlayerState};
pub use special::SevenMove;
pub use state::{GameConfig, GameError, GamePhase, GameState, PLAYER_COUNT};
