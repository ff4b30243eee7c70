use std::time::Duration;

use crate::game::Game;
use crate::game::state::TEAMS;

#[derive(Debug, Default, Clone)]
pub struct GameStats {
    /// Wins per team, indexed like `TEAMS`.
    pub wins: [u32; TEAMS.len()],
    pub unfinished: u32,
    pub games: u32,
    pub total_ticks: u64,
    pub total_rounds: u64,
    pub total_duration: Duration,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game(&mut self, game: &Game, duration: Duration) {
        self.games += 1;
        self.total_duration += duration;
        self.total_ticks += game.ticks as u64;
        if let Some(state) = game.state() {
            self.total_rounds += state.round as u64;
        }

        match game
            .winning_team()
            .and_then(|team| TEAMS.iter().position(|t| *t == team))
        {
            Some(idx) => self.wins[idx] += 1,
            None => self.unfinished += 1,
        }
    }

    pub fn get_avg_ticks(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_ticks as f64 / self.games as f64
    }

    pub fn get_avg_rounds(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_rounds as f64 / self.games as f64
    }

    pub fn get_avg_duration(&self) -> Duration {
        if self.games == 0 {
            return Duration::ZERO;
        }
        self.total_duration / self.games
    }
}

#[derive(Default)]
pub struct StatisticsAccumulator {
    pub stats: GameStats,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn after(&mut self, game: &Game, duration: Duration) {
        self.stats.record_game(game, duration);
    }
}
