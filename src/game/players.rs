use serde::{Deserialize, Serialize};

use crate::board::{self, MARBLES_PER_PLAYER};
use crate::game::cards::Card;
use crate::types::{Cell, Colour};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marble {
    pub pos: Cell,
    /// Set when the marble has just left its kennel onto its start cell.
    pub safe: bool,
}

impl Marble {
    pub fn at(pos: Cell) -> Self {
        Self { pos, safe: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub name: String,
    pub colour: Colour,
    pub hand: Vec<Card>,
    pub marbles: [Marble; MARBLES_PER_PLAYER],
    pub finished: bool,
}

impl PlayerState {
    pub fn new(name: impl Into<String>, colour: Colour) -> Self {
        let kennel = board::layout(colour).kennel;
        Self {
            name: name.into(),
            colour,
            hand: Vec::new(),
            marbles: kennel.map(Marble::at),
            finished: false,
        }
    }

    pub fn holds(&self, card: &Card) -> bool {
        self.hand.contains(card)
    }

    /// Remove one instance of `card` from the hand.
    pub fn remove_card(&mut self, card: &Card) -> Option<Card> {
        let pos = self.hand.iter().position(|c| c == card)?;
        Some(self.hand.remove(pos))
    }

    pub fn marble_at(&self, cell: Cell) -> Option<usize> {
        self.marbles.iter().position(|m| m.pos == cell)
    }

    pub fn kennel_count(&self) -> usize {
        let layout = board::layout(self.colour);
        self.marbles
            .iter()
            .filter(|m| layout.is_kennel(m.pos))
            .count()
    }

    /// Lowest-numbered kennel cell still holding a marble.
    pub fn lowest_kennel_marble(&self) -> Option<Cell> {
        let layout = board::layout(self.colour);
        self.marbles
            .iter()
            .map(|m| m.pos)
            .filter(|pos| layout.is_kennel(*pos))
            .min()
    }

    /// Lowest kennel cell not occupied by one of this player's marbles.
    pub fn free_kennel_cell(&self) -> Cell {
        let layout = board::layout(self.colour);
        layout
            .kennel
            .iter()
            .copied()
            .find(|cell| self.marble_at(*cell).is_none())
            .unwrap_or(layout.kennel[0])
    }

    pub fn all_in_finish(&self) -> bool {
        let layout = board::layout(self.colour);
        self.marbles.iter().all(|m| layout.is_finish(m.pos))
    }

    pub fn positions_valid(&self) -> bool {
        let layout = board::layout(self.colour);
        self.marbles.iter().all(|m| {
            board::is_ring(m.pos) || layout.is_kennel(m.pos) || layout.is_finish(m.pos)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Rank, Suit};

    #[test]
    fn test_new_player_starts_in_kennel() {
        let player = PlayerState::new("Trick", Colour::Green);
        assert_eq!(player.kennel_count(), 4);
        assert_eq!(player.lowest_kennel_marble(), Some(72));
        assert!(player.positions_valid());
        assert!(!player.finished);
    }

    #[test]
    fn test_remove_card_takes_one_instance() {
        let mut player = PlayerState::new("Tick", Colour::Blue);
        let two = Card::new(Suit::Hearts, Rank::Two);
        player.hand = vec![two, two, Card::JOKER];

        assert_eq!(player.remove_card(&two), Some(two));
        assert_eq!(player.hand, vec![two, Card::JOKER]);
        assert_eq!(player.remove_card(&Card::new(Suit::Clubs, Rank::Two)), None);
    }

    #[test]
    fn test_free_kennel_cell_skips_occupied() {
        let mut player = PlayerState::new("Tick", Colour::Blue);
        assert_eq!(player.free_kennel_cell(), 64);
        player.marbles[0].pos = 10;
        assert_eq!(player.free_kennel_cell(), 64);
        player.marbles[0].pos = 64;
        player.marbles[1].pos = 10;
        assert_eq!(player.free_kennel_cell(), 65);
    }

    #[test]
    fn test_all_in_finish() {
        let mut player = PlayerState::new("Track", Colour::Red);
        for (marble, cell) in player.marbles.iter_mut().zip([84, 85, 86, 87]) {
            marble.pos = cell;
        }
        assert!(player.all_in_finish());
        player.marbles[3].pos = 40;
        assert!(!player.all_in_finish());
    }
}
