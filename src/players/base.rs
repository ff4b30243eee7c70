use crate::engine::GameEngine;

/// Move-selection policy for one seat.
pub trait BasePlayer<G: GameEngine> {
    fn decide(&self, view: &G::State, actions: &[G::Action]) -> Option<G::Action>;
}
