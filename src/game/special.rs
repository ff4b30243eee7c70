//! Cards whose effect is more than a single step: the splittable seven,
//! the swapping jack and the joker.

use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board;
use crate::types::{Cell, Rank, Suit};

use super::{
    action::GameAction,
    cards::Card,
    state::{GameError, GameState, SEVEN_STEPS},
};

/// One marble moved as part of a split seven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarbleStep {
    pub seat: usize,
    pub marble: usize,
    pub from: Cell,
    pub to: Cell,
    pub was_safe: bool,
}

/// A marble sent back to its kennel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Displacement {
    pub seat: usize,
    pub marble: usize,
    pub from: Cell,
    pub was_safe: bool,
}

/// Progress of a seven being split across several marbles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SevenMove {
    /// `None` until the first sub-step is played.
    pub remaining: Option<u8>,
    pub moves: Vec<MarbleStep>,
    pub displaced: Vec<Displacement>,
}

impl SevenMove {
    pub fn in_progress(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn budget(&self) -> u8 {
        self.remaining.unwrap_or(SEVEN_STEPS)
    }
}

impl GameState {
    /// Step count a seven spends moving `owner`'s marble from `from` to `to`.
    pub(crate) fn seven_step_len(&self, owner: usize, from: Cell, to: Cell) -> Option<u8> {
        let layout = board::layout(self.players[owner].colour);
        let steps = if board::is_ring(from) {
            if board::is_ring(to) {
                let forward = board::forward_distance(from, to);
                let backward_four = from == layout.start
                    && board::forward_distance(to, from) == 4
                    && forward > SEVEN_STEPS;
                if backward_four { 4 } else { forward }
            } else {
                let lane = layout.lane_index(to)?;
                board::forward_distance(from, layout.start) + lane as u8 + 1
            }
        } else {
            let (i, j) = (layout.lane_index(from)?, layout.lane_index(to)?);
            if j <= i {
                return None;
            }
            (j - i) as u8
        };
        (steps > 0).then_some(steps)
    }

    /// Ring cells a seven sub-step passes over, excluding source and target.
    pub(crate) fn seven_passed_cells(
        &self,
        owner: usize,
        from: Cell,
        to: Cell,
        steps: u8,
    ) -> Vec<Cell> {
        if !board::is_ring(from) {
            return Vec::new();
        }
        if board::is_ring(to) {
            let signed = if board::forward_distance(from, to) == steps {
                steps as i16
            } else {
                -(steps as i16)
            };
            return board::ring_between(from, signed).collect();
        }
        let start = board::layout(self.players[owner].colour).start;
        let to_start = board::forward_distance(from, start);
        let mut cells: Vec<Cell> = board::ring_between(from, to_start as i16).collect();
        if to_start > 0 {
            cells.push(start);
        }
        cells
    }

    /// Undo every sub-step of an abandoned seven. Displaced marbles come back
    /// first so a marble that was both captured and moved ends on its
    /// original cell.
    pub(crate) fn revert_seven(&mut self) {
        let seven = std::mem::take(&mut self.seven);
        for d in seven.displaced.iter().rev() {
            let marble = &mut self.players[d.seat].marbles[d.marble];
            marble.pos = d.from;
            marble.safe = d.was_safe;
        }
        for step in seven.moves.iter().rev() {
            let marble = &mut self.players[step.seat].marbles[step.marble];
            marble.pos = step.from;
            marble.safe = step.was_safe;
        }
        debug!(
            moves = seven.moves.len(),
            displaced = seven.displaced.len(),
            "split seven reverted"
        );
    }

    pub(crate) fn marble_at_any(&self, cell: Cell) -> Option<(usize, usize)> {
        self.players
            .iter()
            .enumerate()
            .find_map(|(seat, player)| player.marble_at(cell).map(|idx| (seat, idx)))
    }

    /// Jack swaps between `owner`'s ring marbles and every unprotected ring
    /// marble of another colour that is off the start cells. With no such
    /// target, the jack swaps two of the owner's own marbles instead.
    pub(crate) fn swap_actions(&self, owner: usize, card: Card) -> Vec<GameAction> {
        let own: Vec<Cell> = self.players[owner]
            .marbles
            .iter()
            .map(|m| m.pos)
            .filter(|pos| board::is_ring(*pos))
            .sorted()
            .collect();

        let targets: Vec<Cell> = self
            .players
            .iter()
            .enumerate()
            .filter(|(seat, _)| *seat != owner)
            .flat_map(|(_, player)| player.marbles.iter())
            .filter(|m| board::is_ring(m.pos) && !m.safe && !board::is_any_start(m.pos))
            .map(|m| m.pos)
            .sorted()
            .collect();

        if targets.is_empty() {
            return own
                .iter()
                .cartesian_product(own.iter())
                .filter(|(a, b)| a != b)
                .map(|(&from, &to)| GameAction::Move { card, from, to })
                .collect();
        }

        own.iter()
            .cartesian_product(targets.iter())
            .flat_map(|(&mine, &theirs)| {
                [
                    GameAction::Move { card, from: mine, to: theirs },
                    GameAction::Move { card, from: theirs, to: mine },
                ]
            })
            .collect()
    }

    pub(crate) fn apply_swap(
        &mut self,
        owner: usize,
        card: Card,
        from: Cell,
        to: Cell,
        rng: &mut impl Rng,
    ) -> Result<(), GameError> {
        if !board::is_ring(from) || !board::is_ring(to) || from == to {
            return Err(GameError::IllegalAction("a jack swaps two distinct ring marbles"));
        }
        let a = self
            .marble_at_any(from)
            .ok_or(GameError::NoMarbleAtSource(from))?;
        let b = self
            .marble_at_any(to)
            .ok_or(GameError::NoMarbleAtSource(to))?;
        if a.0 != owner && b.0 != owner {
            return Err(GameError::NoMarbleAtSource(from));
        }

        for ((seat, idx), pos) in [(a, to), (b, from)] {
            let marble = &mut self.players[seat].marbles[idx];
            marble.pos = pos;
            marble.safe = false;
        }
        debug!(seat = self.idx_player_active, %card, from, to, "marbles swapped");

        self.finish_card(card);
        self.check_victory();
        self.end_turn(rng);
        Ok(())
    }

    /// One substitution per suited card for every joker in `seat`'s hand.
    pub(crate) fn substitution_actions(&self, seat: usize) -> Vec<GameAction> {
        self.players[seat]
            .hand
            .iter()
            .filter(|card| card.is_joker())
            .flat_map(|&card| {
                Suit::ALL
                    .into_iter()
                    .cartesian_product(Rank::SUITED)
                    .map(move |(suit, rank)| GameAction::Substitute {
                        card,
                        replacement: Card::new(suit, rank),
                    })
            })
            .collect()
    }

    /// Spend a joker and make `replacement` the card the next action plays.
    /// The turn stays with the same seat.
    pub(crate) fn apply_substitute(
        &mut self,
        card: Card,
        replacement: Card,
    ) -> Result<(), GameError> {
        if !card.is_joker() {
            return Err(GameError::InvalidWildcardUse("only a joker can be substituted"));
        }
        if replacement.is_joker() || replacement.suit.is_none() {
            return Err(GameError::InvalidWildcardUse(
                "a joker must stand in for a suited card",
            ));
        }
        if self.card_active.is_some() {
            return Err(GameError::IllegalAction("another card is still in play"));
        }
        let seat = self.idx_player_active;
        let Some(joker) = self.players[seat].remove_card(&card) else {
            return Err(GameError::InvalidWildcardUse("no joker in hand"));
        };

        self.discard_pile.push(joker);
        self.card_active = Some(replacement);
        self.wildcard_pending = true;
        debug!(seat, %replacement, "joker substituted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::game::cards::DECK_SIZE;
    use crate::game::state::{GameConfig, GamePhase};

    /// Running state past the exchange, seat 0 active with the given hand.
    /// The hand is pulled out of the piles so the card count stays exact.
    fn running_state(hand: Vec<Card>) -> (GameState, StdRng) {
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = GameState::new(&GameConfig::default(), &mut rng);
        state.card_exchanged = true;
        let old: Vec<Card> = state.players[0].hand.drain(..).collect();
        state.discard_pile.extend(old);
        for card in hand {
            let taken = take_from_piles(&mut state.draw_pile, card)
                .or_else(|| take_from_piles(&mut state.discard_pile, card))
                .or_else(|| {
                    state.players[1..]
                        .iter_mut()
                        .find_map(|p| p.remove_card(&card))
                });
            state.players[0].hand.push(taken.unwrap());
        }
        (state, rng)
    }

    fn take_from_piles(pile: &mut Vec<Card>, card: Card) -> Option<Card> {
        let idx = pile.iter().position(|c| *c == card)?;
        Some(pile.remove(idx))
    }

    fn seven() -> Card {
        Card::new(Suit::Hearts, Rank::Seven)
    }

    #[test]
    fn test_seven_split_then_complete() {
        let (mut state, mut rng) = running_state(vec![seven()]);
        state.players[0].marbles[0].pos = 10;
        state.players[0].marbles[1].pos = 20;

        state
            .apply(Some(GameAction::Move { card: seven(), from: 10, to: 13 }), &mut rng)
            .unwrap();
        assert_eq!(state.seven.remaining, Some(4));
        assert_eq!(state.card_active, Some(seven()));
        assert_eq!(state.idx_player_active, 0);
        assert!(state.players[0].holds(&seven()));

        state
            .apply(Some(GameAction::Move { card: seven(), from: 20, to: 24 }), &mut rng)
            .unwrap();
        assert!(!state.seven.in_progress());
        assert_eq!(state.card_active, None);
        assert_eq!(state.idx_player_active, 1);
        assert!(!state.players[0].holds(&seven()));
        assert_eq!(state.discard_pile.last(), Some(&seven()));
    }

    #[test]
    fn test_seven_overrun_rejected() {
        let (mut state, mut rng) = running_state(vec![seven()]);
        state.players[0].marbles[0].pos = 10;
        state.players[0].marbles[1].pos = 20;
        state
            .apply(Some(GameAction::Move { card: seven(), from: 10, to: 15 }), &mut rng)
            .unwrap();
        let before = state.clone();

        let err = state
            .apply(Some(GameAction::Move { card: seven(), from: 20, to: 23 }), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            GameError::SevenOverrun {
                requested: 3,
                remaining: 2
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_seven_pass_reverts_moves_and_captures() {
        let (mut state, mut rng) = running_state(vec![seven()]);
        state.players[0].marbles[0].pos = 10;
        state.players[1].marbles[0].pos = 12;
        state.players[2].marbles[0].pos = 14;
        let before_marbles: Vec<_> = state.players.iter().map(|p| p.marbles).collect();

        state
            .apply(Some(GameAction::Move { card: seven(), from: 10, to: 14 }), &mut rng)
            .unwrap();
        assert_eq!(state.players[1].marbles[0].pos, 72);
        assert_eq!(state.players[2].marbles[0].pos, 80);

        state.apply(None, &mut rng).unwrap();

        let after_marbles: Vec<_> = state.players.iter().map(|p| p.marbles).collect();
        assert_eq!(before_marbles, after_marbles);
        assert!(!state.seven.in_progress());
        assert_eq!(state.card_active, None);
        assert!(!state.players[0].holds(&seven()));
        assert_eq!(state.idx_player_active, 1);
        assert_eq!(state.total_cards(), DECK_SIZE);
    }

    #[test]
    fn test_reverted_seven_does_not_finish_player() {
        let (mut state, mut rng) = running_state(vec![seven()]);
        for (idx, cell) in [62, 69, 70, 71].into_iter().enumerate() {
            state.players[0].marbles[idx].pos = cell;
        }

        state
            .apply(Some(GameAction::Move { card: seven(), from: 62, to: 68 }), &mut rng)
            .unwrap();
        assert_eq!(state.seven.remaining, Some(4));
        assert!(state.players[0].all_in_finish());
        assert!(!state.players[0].finished);

        state.apply(None, &mut rng).unwrap();

        let player = &state.players[0];
        assert_eq!(player.marbles[0].pos, 62);
        assert_eq!(player.finished, player.all_in_finish());
        assert!(!player.finished);
        assert_eq!(state.marble_owner(0), 0);
    }

    #[test]
    fn test_seven_finishing_team_ends_game_mid_split() {
        let (mut state, mut rng) = running_state(vec![seven()]);
        for (idx, cell) in [62, 69, 70, 71].into_iter().enumerate() {
            state.players[0].marbles[idx].pos = cell;
        }
        let red = board::layout(state.players[2].colour).finish;
        for (marble, cell) in state.players[2].marbles.iter_mut().zip(red) {
            marble.pos = cell;
        }

        state
            .apply(Some(GameAction::Move { card: seven(), from: 62, to: 68 }), &mut rng)
            .unwrap();

        assert!(state.players[0].finished);
        assert_eq!(state.phase, GamePhase::Finished);
        assert_eq!(state.apply(None, &mut rng), Err(GameError::GameFinished));
    }

    #[test]
    fn test_seven_backward_four_from_start() {
        let (state, _) = running_state(vec![seven()]);
        assert_eq!(state.seven_step_len(0, 0, 60), Some(4));
        assert_eq!(state.seven_step_len(0, 0, 3), Some(3));
        assert_eq!(state.seven_step_len(0, 5, 1), Some(60));
        assert_eq!(state.seven_step_len(0, 62, 69), Some(4));
        assert_eq!(state.seven_step_len(0, 68, 70), Some(2));
        assert_eq!(state.seven_step_len(0, 70, 68), None);
    }

    #[test]
    fn test_jack_swaps_with_opponent() {
        let jack = Card::new(Suit::Spades, Rank::Jack);
        let (mut state, mut rng) = running_state(vec![jack]);
        state.players[0].marbles[0].pos = 5;
        state.players[1].marbles[0].pos = 30;

        let actions = state.swap_actions(0, jack);
        assert_eq!(
            actions,
            vec![
                GameAction::Move { card: jack, from: 5, to: 30 },
                GameAction::Move { card: jack, from: 30, to: 5 },
            ]
        );

        state.apply(Some(actions[1]), &mut rng).unwrap();
        assert_eq!(state.players[0].marbles[0].pos, 30);
        assert_eq!(state.players[1].marbles[0].pos, 5);
        assert_eq!(state.idx_player_active, 1);
    }

    #[test]
    fn test_jack_ignores_protected_marbles() {
        let jack = Card::new(Suit::Spades, Rank::Jack);
        let (mut state, _) = running_state(vec![jack]);
        state.players[0].marbles[0].pos = 5;
        state.players[0].marbles[1].pos = 9;
        state.players[1].marbles[0].pos = 16;
        state.players[2].marbles[0].pos = 40;
        state.players[2].marbles[0].safe = true;

        let actions = state.swap_actions(0, jack);
        assert_eq!(
            actions,
            vec![
                GameAction::Move { card: jack, from: 5, to: 9 },
                GameAction::Move { card: jack, from: 9, to: 5 },
            ]
        );
    }

    #[test]
    fn test_swap_requires_own_marble() {
        let jack = Card::new(Suit::Spades, Rank::Jack);
        let (mut state, mut rng) = running_state(vec![jack]);
        state.players[1].marbles[0].pos = 20;
        state.players[2].marbles[0].pos = 30;

        let err = state
            .apply(Some(GameAction::Move { card: jack, from: 20, to: 30 }), &mut rng)
            .unwrap_err();
        assert_eq!(err, GameError::NoMarbleAtSource(20));
    }

    #[test]
    fn test_joker_substitution_flow() {
        let (mut state, mut rng) = running_state(vec![Card::JOKER]);
        let ace = Card::new(Suit::Diamonds, Rank::Ace);

        let subs = state.substitution_actions(0);
        assert_eq!(subs.len(), 52);

        state
            .apply(Some(GameAction::Substitute { card: Card::JOKER, replacement: ace }), &mut rng)
            .unwrap();
        assert_eq!(state.card_active, Some(ace));
        assert!(state.wildcard_pending);
        assert_eq!(state.idx_player_active, 0);
        assert!(state.players[0].hand.is_empty());
        assert_eq!(state.total_cards(), DECK_SIZE);

        let actions = state.legal_actions();
        let exit = GameAction::Move { card: ace, from: 64, to: 0 };
        assert!(actions.contains(&exit));
        assert!(actions.iter().all(|a| a.card() == ace));

        state.apply(Some(exit), &mut rng).unwrap();
        assert_eq!(state.card_active, None);
        assert!(!state.wildcard_pending);
        assert_eq!(state.players[0].marbles[0].pos, 0);
        assert_eq!(state.total_cards(), DECK_SIZE);
    }

    #[test]
    fn test_invalid_substitutions() {
        let two = Card::new(Suit::Clubs, Rank::Two);
        let (mut state, _) = running_state(vec![two, Card::JOKER]);

        let err = state.apply_substitute(two, Card::new(Suit::Clubs, Rank::Ace));
        assert!(matches!(err, Err(GameError::InvalidWildcardUse(_))));

        let err = state.apply_substitute(Card::JOKER, Card::JOKER);
        assert!(matches!(err, Err(GameError::InvalidWildcardUse(_))));

        state.players[0].hand = vec![two];
        let err = state.apply_substitute(Card::JOKER, two);
        assert!(matches!(err, Err(GameError::InvalidWildcardUse(_))));
        assert_eq!(state.players[0].hand, vec![two]);
    }

    #[test]
    fn test_pass_clears_pending_substitution() {
        let (mut state, mut rng) = running_state(vec![Card::JOKER, Card::JOKER]);
        let king = Card::new(Suit::Spades, Rank::King);
        state.apply_substitute(Card::JOKER, king).unwrap();

        state.apply(None, &mut rng).unwrap();

        assert_eq!(state.card_active, None);
        assert!(!state.wildcard_pending);
        assert!(state.players[0].hand.is_empty());
        assert_eq!(state.idx_player_active, 1);
        assert_eq!(state.total_cards(), DECK_SIZE);
    }
}
