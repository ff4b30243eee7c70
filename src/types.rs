use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Board cell id. Ring cells are `0..64`, kennels and finish lanes live above.
pub type Cell = u8;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
pub enum Suit {
    #[strum(serialize = "♠")]
    Spades,
    #[strum(serialize = "♥")]
    Hearts,
    #[strum(serialize = "♦")]
    Diamonds,
    #[strum(serialize = "♣")]
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
pub enum Rank {
    #[strum(serialize = "2")]
    Two,
    #[strum(serialize = "3")]
    Three,
    #[strum(serialize = "4")]
    Four,
    #[strum(serialize = "5")]
    Five,
    #[strum(serialize = "6")]
    Six,
    #[strum(serialize = "7")]
    Seven,
    #[strum(serialize = "8")]
    Eight,
    #[strum(serialize = "9")]
    Nine,
    #[strum(serialize = "10")]
    Ten,
    #[strum(serialize = "J")]
    Jack,
    #[strum(serialize = "Q")]
    Queen,
    #[strum(serialize = "K")]
    King,
    #[strum(serialize = "A")]
    Ace,
    #[strum(serialize = "JKR")]
    Joker,
}

impl Rank {
    /// The thirteen suited ranks, i.e. every rank a joker may stand in for.
    pub const SUITED: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Ranks allowed to bring a marble out of the kennel.
    pub fn can_leave_kennel(self) -> bool {
        matches!(self, Rank::Ace | Rank::King | Rank::Joker)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Colour {
    Blue,
    Green,
    Red,
    Yellow,
}

impl Colour {
    /// Seat order: seat `i` always plays `ORDERED[i]`.
    pub const ORDERED: [Colour; 4] = [Colour::Blue, Colour::Green, Colour::Red, Colour::Yellow];

    pub fn seat(self) -> usize {
        match self {
            Colour::Blue => 0,
            Colour::Green => 1,
            Colour::Red => 2,
            Colour::Yellow => 3,
        }
    }
}
