use std::fmt;

use itertools::Itertools;

use crate::board::{self, RING_SIZE};
use crate::game::GameState;
use crate::types::Colour;

fn colour_char(colour: Colour) -> char {
    match colour {
        Colour::Blue => 'B',
        Colour::Green => 'G',
        Colour::Red => 'R',
        Colour::Yellow => 'Y',
    }
}

/// One character per ring cell: the owner's initial, lowercase when the
/// marble is protected, `|` for an empty start cell and `.` otherwise.
pub fn render_ring(state: &GameState) -> String {
    let mut cells: Vec<char> = (0..RING_SIZE)
        .map(|cell| if board::is_any_start(cell) { '|' } else { '.' })
        .collect();
    for player in &state.players {
        let c = colour_char(player.colour);
        for marble in player.marbles.iter().filter(|m| board::is_ring(m.pos)) {
            cells[marble.pos as usize] = if marble.safe { c.to_ascii_lowercase() } else { c };
        }
    }
    cells.into_iter().collect()
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "round {} ({:?}), starter {}, active {}{}",
            self.round,
            self.phase,
            self.idx_player_started,
            self.idx_player_active,
            if self.card_exchanged { "" } else { ", exchanging" },
        )?;
        if let Some(card) = self.card_active {
            match self.seven.remaining {
                Some(left) => writeln!(f, "active card {card} ({left} steps left)")?,
                None => writeln!(f, "active card {card}")?,
            }
        }
        writeln!(f, "ring  {}", render_ring(self))?;
        for (seat, player) in self.players.iter().enumerate() {
            let marbles = player.marbles.iter().map(|m| m.pos).join(" ");
            let hand = player.hand.iter().join(" ");
            writeln!(
                f,
                "{seat} {:<7} {:<6} marbles [{marbles}] hand [{hand}]{}",
                player.colour.to_string(),
                player.name,
                if player.finished { " finished" } else { "" },
            )?;
        }
        write!(
            f,
            "draw {} discard {}",
            self.draw_pile.len(),
            self.discard_pile.len()
        )
    }
}
