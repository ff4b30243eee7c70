use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::{Rank, Suit};

pub const JOKERS_PER_DECK: usize = 3;
pub const DECK_COPIES: usize = 2;
pub const DECK_SIZE: usize = DECK_COPIES * (Suit::ALL.len() * Rank::SUITED.len() + JOKERS_PER_DECK);

/// A playing card. Jokers carry no suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Option<Suit>,
    pub rank: Rank,
}

impl Card {
    pub const JOKER: Card = Card {
        suit: None,
        rank: Rank::Joker,
    };

    pub const fn new(suit: Suit, rank: Rank) -> Self {
        Self {
            suit: Some(suit),
            rank,
        }
    }

    pub fn is_joker(&self) -> bool {
        self.rank == Rank::Joker
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suit {
            Some(suit) => write!(f, "{suit}{}", self.rank),
            None => write!(f, "{}", self.rank),
        }
    }
}

pub type Distances = SmallVec<[i8; 14]>;

/// Signed step counts a rank may move a ring marble. Jacks swap instead of
/// moving; the seven's set is the full budget and gets narrowed while a
/// split is running.
pub fn distances(rank: Rank) -> Distances {
    let steps: &[i8] = match rank {
        Rank::Two => &[2],
        Rank::Three => &[3],
        Rank::Four => &[4, -4],
        Rank::Five => &[5],
        Rank::Six => &[6],
        Rank::Seven => &[1, 2, 3, 4, 5, 6, 7],
        Rank::Eight => &[8],
        Rank::Nine => &[9],
        Rank::Ten => &[10],
        Rank::Jack => &[],
        Rank::Queen => &[12],
        Rank::King => &[13],
        Rank::Ace => &[1, 11],
        Rank::Joker => &[-1, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13],
    };
    SmallVec::from_slice(steps)
}

/// The full 110-card deck in canonical order. Each game copies and shuffles
/// it into its own draw pile.
pub fn build_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for _ in 0..DECK_COPIES {
        for rank in Rank::SUITED {
            for suit in Suit::ALL {
                deck.push(Card::new(suit, rank));
            }
        }
        for _ in 0..JOKERS_PER_DECK {
            deck.push(Card::JOKER);
        }
    }
    deck
}
