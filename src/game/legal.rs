use crate::board::{self, LANE_LEN, MARBLES_PER_PLAYER};
use crate::types::{Cell, Rank};

use super::{
    action::{GameAction, dedup_actions},
    cards::{Card, Distances, distances},
    players::Marble,
    state::{GamePhase, GameState},
};

impl GameState {
    /// Every action the active seat may take right now, duplicates removed.
    /// Passing is always allowed and never listed.
    pub fn legal_actions(&self) -> Vec<GameAction> {
        if self.phase != GamePhase::Running {
            return Vec::new();
        }
        let seat = self.idx_player_active;
        let player = &self.players[seat];

        if !self.card_exchanged {
            return dedup_actions(
                player
                    .hand
                    .iter()
                    .map(|&card| GameAction::Exchange { card })
                    .collect(),
            );
        }

        let owner = self.marble_owner(seat);
        let actions = if let Some(card) = self.card_active {
            self.card_actions(owner, card)
        } else if self.players[owner].kennel_count() == MARBLES_PER_PLAYER {
            self.kennel_actions(seat, owner)
        } else if player.hand.iter().any(Card::is_joker) {
            self.substitution_actions(seat)
        } else {
            player
                .hand
                .iter()
                .flat_map(|&card| self.card_actions(owner, card))
                .collect()
        };
        dedup_actions(actions)
    }

    /// All marbles still at home: only cards that open the kennel help.
    fn kennel_actions(&self, seat: usize, owner: usize) -> Vec<GameAction> {
        let marbles = &self.players[owner];
        let start = board::layout(marbles.colour).start;
        let mut actions: Vec<GameAction> = match marbles.lowest_kennel_marble() {
            Some(from) => self.players[seat]
                .hand
                .iter()
                .filter(|card| card.rank.can_leave_kennel())
                .map(|&card| GameAction::Move { card, from, to: start })
                .collect(),
            None => Vec::new(),
        };
        actions.extend(self.substitution_actions(seat));
        actions
    }

    /// Moves `card` allows for `owner`'s marbles.
    pub(crate) fn card_actions(&self, owner: usize, card: Card) -> Vec<GameAction> {
        if card.rank == Rank::Jack {
            return self.swap_actions(owner, card);
        }
        let player = &self.players[owner];
        let layout = board::layout(player.colour);
        let mut actions = Vec::new();

        if card.rank.can_leave_kennel() && player.marble_at(layout.start).is_none() {
            if let Some(from) = player.lowest_kennel_marble() {
                actions.push(GameAction::Move { card, from, to: layout.start });
            }
        }

        let steps = self.step_options(card.rank);
        for marble in player.marbles {
            if board::is_ring(marble.pos) {
                for &d in &steps {
                    if let Some(to) = self.ring_target(marble, d) {
                        actions.push(GameAction::Move { card, from: marble.pos, to });
                    }
                    if let Some(to) = self.lane_entry_target(owner, marble, d) {
                        actions.push(GameAction::Move { card, from: marble.pos, to });
                    }
                }
                let backward_four = card.rank == Rank::Seven
                    && marble.pos == layout.start
                    && self.seven.budget() >= 4;
                if backward_four {
                    if let Some(to) = self.ring_target(marble, -4) {
                        actions.push(GameAction::Move { card, from: marble.pos, to });
                    }
                }
            } else if layout.is_finish(marble.pos) {
                for &d in &steps {
                    if let Some(to) = self.lane_target(owner, marble, d) {
                        actions.push(GameAction::Move { card, from: marble.pos, to });
                    }
                }
            }
        }
        actions
    }

    /// Distances playable with `rank`; a running seven only offers what is
    /// left of its budget.
    fn step_options(&self, rank: Rank) -> Distances {
        if rank == Rank::Seven {
            (1..=self.seven.budget() as i8).collect()
        } else {
            distances(rank)
        }
    }

    pub fn safe_marble_at(&self, cell: Cell) -> bool {
        self.players
            .iter()
            .flat_map(|p| p.marbles.iter())
            .any(|m| m.pos == cell && m.safe)
    }

    /// Whether a protected marble sits strictly between `from` and the cell
    /// `steps` away along the ring.
    pub fn safe_marble_between(&self, from: Cell, steps: i16) -> bool {
        board::ring_between(from, steps).any(|cell| self.safe_marble_at(cell))
    }

    fn ring_target(&self, marble: Marble, steps: i8) -> Option<Cell> {
        let to = board::ring_step(marble.pos, steps as i16);
        if self.safe_marble_between(marble.pos, steps as i16) || self.safe_marble_at(to) {
            return None;
        }
        Some(to)
    }

    /// Finish-lane cell reached by moving `steps` past the owner's start.
    /// A marble still protected on its start has not gone round yet.
    fn lane_entry_target(&self, owner: usize, marble: Marble, steps: i8) -> Option<Cell> {
        if marble.safe || steps <= 0 {
            return None;
        }
        let player = &self.players[owner];
        let layout = board::layout(player.colour);
        let to_start = board::forward_distance(marble.pos, layout.start) as i8;
        let into_lane = steps - to_start;
        if into_lane < 1 || into_lane as usize > LANE_LEN {
            return None;
        }
        if to_start > 0
            && (self.safe_marble_between(marble.pos, to_start as i16)
                || self.safe_marble_at(layout.start))
        {
            return None;
        }
        let lane = into_lane as usize - 1;
        if layout.finish[..=lane]
            .iter()
            .any(|cell| player.marble_at(*cell).is_some())
        {
            return None;
        }
        Some(layout.finish[lane])
    }

    /// Advance within the finish lane without jumping over own marbles.
    fn lane_target(&self, owner: usize, marble: Marble, steps: i8) -> Option<Cell> {
        if steps <= 0 {
            return None;
        }
        let player = &self.players[owner];
        let layout = board::layout(player.colour);
        let from = layout.lane_index(marble.pos)?;
        let to = from + steps as usize;
        if to >= LANE_LEN {
            return None;
        }
        if layout.finish[from + 1..=to]
            .iter()
            .any(|cell| player.marble_at(*cell).is_some())
        {
            return None;
        }
        Some(layout.finish[to])
    }
}
