//! Board layout: the shared 64-cell ring plus each colour's kennel and
//! finish lane.
//!
//! Ring cells are `0..64`. Every colour owns a block of eight private cells
//! above the ring: four kennel cells followed by four finish-lane cells
//! (Blue `64..72`, Green `72..80`, Red `80..88`, Yellow `88..96`).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::types::{Cell, Colour};

pub const RING_SIZE: u8 = 64;
pub const MARBLES_PER_PLAYER: usize = 4;
pub const LANE_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColourLayout {
    pub kennel: [Cell; MARBLES_PER_PLAYER],
    pub start: Cell,
    /// Finish lane, index 0 nearest to the ring.
    pub finish: [Cell; LANE_LEN],
}

impl ColourLayout {
    fn build(colour: Colour) -> Self {
        let seat = colour.seat() as Cell;
        let base = RING_SIZE + seat * 8;
        Self {
            kennel: [base, base + 1, base + 2, base + 3],
            start: seat * (RING_SIZE / 4),
            finish: [base + 4, base + 5, base + 6, base + 7],
        }
    }

    pub fn is_kennel(&self, cell: Cell) -> bool {
        self.kennel.contains(&cell)
    }

    pub fn lane_index(&self, cell: Cell) -> Option<usize> {
        self.finish.iter().position(|&c| c == cell)
    }

    pub fn is_finish(&self, cell: Cell) -> bool {
        self.lane_index(cell).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Ring,
    Kennel(Colour),
    Finish { colour: Colour, lane: usize },
}

static LAYOUTS: Lazy<HashMap<Colour, ColourLayout>> = Lazy::new(|| {
    Colour::iter()
        .map(|colour| (colour, ColourLayout::build(colour)))
        .collect()
});

static PRIVATE_ZONES: Lazy<HashMap<Cell, Zone>> = Lazy::new(|| {
    let mut zones = HashMap::new();
    for (colour, layout) in LAYOUTS.iter() {
        for cell in layout.kennel {
            zones.insert(cell, Zone::Kennel(*colour));
        }
        for (lane, cell) in layout.finish.iter().enumerate() {
            zones.insert(
                *cell,
                Zone::Finish {
                    colour: *colour,
                    lane,
                },
            );
        }
    }
    zones
});

pub fn layout(colour: Colour) -> &'static ColourLayout {
    &LAYOUTS[&colour]
}

/// Classify a cell; `None` for ids outside the board.
pub fn zone(cell: Cell) -> Option<Zone> {
    if cell < RING_SIZE {
        return Some(Zone::Ring);
    }
    PRIVATE_ZONES.get(&cell).copied()
}

pub fn is_ring(cell: Cell) -> bool {
    cell < RING_SIZE
}

pub fn is_any_start(cell: Cell) -> bool {
    LAYOUTS.values().any(|layout| layout.start == cell)
}

/// Ring cell reached from `cell` after `steps` (negative = backwards).
pub fn ring_step(cell: Cell, steps: i16) -> Cell {
    (cell as i16 + steps).rem_euclid(RING_SIZE as i16) as Cell
}

/// Forward step count from `from` to `to` along the ring.
pub fn forward_distance(from: Cell, to: Cell) -> u8 {
    (to as i16 - from as i16).rem_euclid(RING_SIZE as i16) as u8
}

/// Ring cells strictly between `from` and `from + steps`, in travel order.
/// Crossing cell 0 is handled by the modulo.
pub fn ring_between(from: Cell, steps: i16) -> impl Iterator<Item = Cell> {
    let dir: i16 = if steps < 0 { -1 } else { 1 };
    (1..steps.abs()).map(move |k| ring_step(from, dir * k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_cells() {
        let blue = layout(Colour::Blue);
        assert_eq!(blue.kennel, [64, 65, 66, 67]);
        assert_eq!(blue.start, 0);
        assert_eq!(blue.finish, [68, 69, 70, 71]);

        let yellow = layout(Colour::Yellow);
        assert_eq!(yellow.kennel, [88, 89, 90, 91]);
        assert_eq!(yellow.start, 48);
        assert_eq!(yellow.finish, [92, 93, 94, 95]);
    }

    #[test]
    fn test_zone_lookup() {
        assert_eq!(zone(10), Some(Zone::Ring));
        assert_eq!(zone(73), Some(Zone::Kennel(Colour::Green)));
        assert_eq!(
            zone(86),
            Some(Zone::Finish {
                colour: Colour::Red,
                lane: 2
            })
        );
        assert_eq!(zone(96), None);
    }

    #[test]
    fn test_ring_arithmetic() {
        assert_eq!(ring_step(62, 4), 2);
        assert_eq!(ring_step(1, -4), 61);
        assert_eq!(forward_distance(60, 2), 6);
        assert_eq!(forward_distance(5, 5), 0);
    }

    #[test]
    fn test_ring_between_wraps() {
        let forward: Vec<_> = ring_between(62, 4).collect();
        assert_eq!(forward, vec![63, 0, 1]);

        let backward: Vec<_> = ring_between(1, -4).collect();
        assert_eq!(backward, vec![0, 63, 62]);

        assert_eq!(ring_between(7, 1).count(), 0);
    }

    #[test]
    fn test_start_cells() {
        for cell in [0, 16, 32, 48] {
            assert!(is_any_start(cell));
        }
        assert!(!is_any_start(8));
    }
}
