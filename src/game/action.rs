use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::cards::Card;
use crate::types::Cell;

/// One choice of the active player. `None` at the call site means "pass".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Hand a card face-down to the team partner (exchange sub-phase only).
    Exchange { card: Card },
    /// Move a marble from `from` to `to`; a Jack swaps the marbles on both cells.
    Move { card: Card, from: Cell, to: Cell },
    /// Declare which card a joker stands in for.
    Substitute { card: Card, replacement: Card },
}

impl GameAction {
    pub fn card(&self) -> Card {
        match self {
            GameAction::Exchange { card }
            | GameAction::Move { card, .. }
            | GameAction::Substitute { card, .. } => *card,
        }
    }

    pub fn positions(&self) -> Option<(Cell, Cell)> {
        match self {
            GameAction::Move { from, to, .. } => Some((*from, *to)),
            _ => None,
        }
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameAction::Exchange { card } => write!(f, "exchange {card}"),
            GameAction::Move { card, from, to } => write!(f, "{card}: {from} -> {to}"),
            GameAction::Substitute { card, replacement } => write!(f, "{card} as {replacement}"),
        }
    }
}

/// Drop later duplicates, keeping first-seen order.
pub(crate) fn dedup_actions(actions: Vec<GameAction>) -> Vec<GameAction> {
    let mut unique: Vec<GameAction> = Vec::with_capacity(actions.len());
    for action in actions {
        if !unique.contains(&action) {
            unique.push(action);
        }
    }
    unique
}
