use crate::game::{Game, GameAction, GameState};
use crate::players::{BasePlayer, RandomPlayer};

pub struct CliPlayer {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CLI_PLAYERS: &[CliPlayer] = &[CliPlayer {
    code: "R",
    name: "RandomPlayer",
    description: "Chooses actions at random.",
}];

pub enum PlayerInstance {
    Random(RandomPlayer),
}

impl PlayerInstance {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerInstance::Random(_) => "Random",
        }
    }
}

impl BasePlayer<Game> for PlayerInstance {
    fn decide(&self, view: &GameState, actions: &[GameAction]) -> Option<GameAction> {
        match self {
            PlayerInstance::Random(p) => BasePlayer::<Game>::decide(p, view, actions),
        }
    }
}

/// Build a player from its code. `seed` makes the player's choices
/// reproducible.
pub fn create_player(code: &str, seed: Option<u64>) -> Option<PlayerInstance> {
    match code.to_uppercase().as_str() {
        "R" => Some(PlayerInstance::Random(RandomPlayer::new(seed))),
        _ => None,
    }
}

pub fn print_player_help() {
    println!("Player Legend:");
    println!("{:<5} {:<25} {}", "CODE", "PLAYER", "DESCRIPTION");
    println!("{}", "-".repeat(80));
    for player in CLI_PLAYERS {
        println!("{:<5} {:<25} {}", player.code, player.name, player.description);
    }
}
