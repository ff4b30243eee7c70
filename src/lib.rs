#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod board;
pub mod cli;
pub mod engine;
pub mod game;
pub mod players;
pub mod types;

pub use engine::GameEngine;
pub use game::{Card, Game, GameAction, GameConfig, GameError, GamePhase, GameState};
pub use types::{Cell, Colour, Rank, Suit};
