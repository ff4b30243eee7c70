use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::engine::GameEngine;
use crate::players::BasePlayer;

/// Picks uniformly among the legal actions.
pub struct RandomPlayer {
    rng: Mutex<StdRng>,
}

impl RandomPlayer {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<G: GameEngine> BasePlayer<G> for RandomPlayer {
    fn decide(&self, _view: &G::State, actions: &[G::Action]) -> Option<G::Action> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        actions.choose(&mut *rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Game, GameAction, GameConfig, GameState};

    fn decide(player: &RandomPlayer, view: &GameState, actions: &[GameAction]) -> Option<GameAction> {
        <RandomPlayer as BasePlayer<Game>>::decide(player, view, actions)
    }

    #[test]
    fn test_empty_list_gives_none() {
        let game = Game::new(GameConfig::default());
        let view = game.get_player_view(0).unwrap();
        assert_eq!(decide(&RandomPlayer::new(Some(1)), &view, &[]), None);
    }

    #[test]
    fn test_choice_comes_from_list() {
        let game = Game::new(GameConfig::default());
        let view = game.get_player_view(0).unwrap();
        let actions = game.get_list_action().unwrap();
        let player = RandomPlayer::new(Some(1));
        for _ in 0..20 {
            let choice = decide(&player, &view, &actions).unwrap();
            assert!(actions.contains(&choice));
        }
    }

    #[test]
    fn test_seeded_players_agree() {
        let game = Game::new(GameConfig::default());
        let view = game.get_player_view(0).unwrap();
        let actions = game.get_list_action().unwrap();
        let a = RandomPlayer::new(Some(8));
        let b = RandomPlayer::new(Some(8));
        for _ in 0..10 {
            assert_eq!(decide(&a, &view, &actions), decide(&b, &view, &actions));
        }
    }
}
