use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{self, MARBLES_PER_PLAYER, Zone};
use crate::types::{Cell, Colour, Rank};

use super::{
    action::GameAction,
    cards::{Card, build_deck},
    players::PlayerState,
    special::{Displacement, MarbleStep, SevenMove},
};

pub const PLAYER_COUNT: usize = 4;
pub const SEVEN_STEPS: u8 = 7;
/// Seat pairs that win together.
pub const TEAMS: [[usize; 2]; 2] = [[0, 2], [1, 3]];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub seed: u64,
    pub player_names: [String; PLAYER_COUNT],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            player_names: ["Tick", "Trick", "Track", "Donald"].map(String::from),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Setup,
    Running,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("game state not initialized")]
    StateNotInitialized,
    #[error("game already finished")]
    GameFinished,
    #[error("card {0} is not held by the active player")]
    CardNotHeld(Card),
    #[error("no marble of the active player at cell {0}")]
    NoMarbleAtSource(Cell),
    #[error("cell {0} is not on the board")]
    InvalidCell(Cell),
    #[error("invalid wildcard use: {0}")]
    InvalidWildcardUse(&'static str),
    #[error("action not allowed at this stage: {0}")]
    IllegalAction(&'static str),
    #[error("seven sub-step of {requested} exceeds the {remaining} remaining steps")]
    SevenOverrun { requested: u8, remaining: u8 },
    #[error("invalid player index {0}")]
    InvalidPlayer(usize),
}

/// A card handed to the team partner, held back until all four seats have
/// chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangedCard {
    pub to: usize,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub round: u32,
    pub card_exchanged: bool,
    pub idx_player_started: usize,
    pub idx_player_active: usize,
    pub players: Vec<PlayerState>,
    pub draw_pile: Vec<Card>,
    pub discard_pile: Vec<Card>,
    /// Card whose effect spans several actions: a seven being split, or
    /// the card a joker was declared as.
    pub card_active: Option<Card>,
    /// `card_active` is a joker's declared replacement, not a card in hand.
    #[serde(default)]
    pub wildcard_pending: bool,
    #[serde(default)]
    pub seven: SevenMove,
    #[serde(default)]
    pub exchange_buffer: Vec<ExchangedCard>,
}

impl GameState {
    pub fn new(config: &GameConfig, rng: &mut impl Rng) -> Self {
        let mut draw_pile = build_deck();
        draw_pile.shuffle(rng);
        let players = Colour::ORDERED
            .iter()
            .zip(config.player_names.iter())
            .map(|(colour, name)| PlayerState::new(name.clone(), *colour))
            .collect();

        let mut state = Self {
            phase: GamePhase::Running,
            round: 1,
            card_exchanged: false,
            idx_player_started: 0,
            idx_player_active: 0,
            players,
            draw_pile,
            discard_pile: Vec::new(),
            card_active: None,
            wildcard_pending: false,
            seven: SevenMove::default(),
            exchange_buffer: Vec::new(),
        };
        state.deal(rng);
        state
    }

    /// Cards dealt per seat: 6, 5, 4, 3, 2, then the cycle repeats.
    pub fn hand_size_for_round(round: u32) -> usize {
        6 - ((round.max(1) - 1) % 5) as usize
    }

    pub fn partner(seat: usize) -> usize {
        (seat + 2) % PLAYER_COUNT
    }

    /// Seat whose marbles `seat` moves: its own, or its partner's once it
    /// has brought all four home.
    pub fn marble_owner(&self, seat: usize) -> usize {
        let player = &self.players[seat];
        if player.finished || player.all_in_finish() {
            Self::partner(seat)
        } else {
            seat
        }
    }

    pub fn active_player(&self) -> &PlayerState {
        &self.players[self.idx_player_active]
    }

    /// Every card the game accounts for: hands, piles and the exchange buffer.
    pub fn total_cards(&self) -> usize {
        self.players.iter().map(|p| p.hand.len()).sum::<usize>()
            + self.draw_pile.len()
            + self.discard_pile.len()
            + self.exchange_buffer.len()
    }

    pub fn winning_team(&self) -> Option<[usize; 2]> {
        TEAMS
            .iter()
            .copied()
            .find(|team| team.iter().all(|seat| self.players[*seat].finished))
    }

    /// Apply one action, or a pass when `action` is `None`.
    ///
    /// Every precondition is checked before the first write, so a returned
    /// error leaves the state untouched.
    pub fn apply(
        &mut self,
        action: Option<GameAction>,
        rng: &mut impl Rng,
    ) -> Result<(), GameError> {
        if self.phase == GamePhase::Finished {
            return Err(GameError::GameFinished);
        }
        let Some(action) = action else {
            self.apply_pass(rng);
            return Ok(());
        };

        match action {
            GameAction::Exchange { card } => self.apply_exchange(card, rng),
            _ if !self.card_exchanged => Err(GameError::IllegalAction(
                "only card exchanges are allowed before the exchange completes",
            )),
            GameAction::Move { card, from, to } => self.apply_move(card, from, to, rng),
            GameAction::Substitute { card, replacement } => {
                self.apply_substitute(card, replacement)
            }
        }
    }

    fn apply_exchange(&mut self, card: Card, rng: &mut impl Rng) -> Result<(), GameError> {
        if self.card_exchanged {
            return Err(GameError::IllegalAction("cards were already exchanged this round"));
        }
        let seat = self.idx_player_active;
        let Some(card) = self.players[seat].remove_card(&card) else {
            return Err(GameError::CardNotHeld(card));
        };
        let to = Self::partner(seat);
        debug!(seat, to, %card, "card exchanged");
        self.exchange_buffer.push(ExchangedCard { to, card });
        self.advance_exchange(rng);
        Ok(())
    }

    fn advance_exchange(&mut self, rng: &mut impl Rng) {
        self.idx_player_active = (self.idx_player_active + 1) % PLAYER_COUNT;
        if self.idx_player_active != self.idx_player_started {
            return;
        }
        for ExchangedCard { to, card } in self.exchange_buffer.drain(..) {
            self.players[to].hand.push(card);
        }
        self.card_exchanged = true;
        debug!(round = self.round, "card exchange completed");
        // Seats may have passed with empty hands.
        self.start_round_if_exhausted(rng);
    }

    fn apply_move(
        &mut self,
        card: Card,
        from: Cell,
        to: Cell,
        rng: &mut impl Rng,
    ) -> Result<(), GameError> {
        for cell in [from, to] {
            if board::zone(cell).is_none() {
                return Err(GameError::InvalidCell(cell));
            }
        }
        let seat = self.idx_player_active;
        let plays_active_card = self.card_active == Some(card);
        if let Some(active) = self.card_active {
            if active != card {
                return Err(GameError::IllegalAction("another card is still in play"));
            }
        }
        if !self.players[seat].holds(&card) && !(plays_active_card && self.wildcard_pending) {
            return Err(GameError::CardNotHeld(card));
        }

        let owner = self.marble_owner(seat);
        if card.rank == Rank::Jack {
            return self.apply_swap(owner, card, from, to, rng);
        }
        let colour = self.players[owner].colour;
        let layout = board::layout(colour);
        Self::check_move_cells(colour, from, to)?;
        let marble_idx = self.players[owner]
            .marble_at(from)
            .ok_or(GameError::NoMarbleAtSource(from))?;

        let seven_steps = if card.rank == Rank::Seven {
            let steps = self
                .seven_step_len(owner, from, to)
                .ok_or(GameError::IllegalAction("a seven cannot make this move"))?;
            let remaining = self.seven.budget();
            if steps > remaining {
                return Err(GameError::SevenOverrun {
                    requested: steps,
                    remaining,
                });
            }
            Some(steps)
        } else {
            None
        };

        let marble = &mut self.players[owner].marbles[marble_idx];
        let was_safe = marble.safe;
        marble.pos = to;
        marble.safe = layout.is_kennel(from) && to == layout.start;
        debug!(seat, owner, %card, from, to, "marble moved");

        let mut displaced = self.send_home(to, (owner, marble_idx));
        if let Some(steps) = seven_steps {
            for cell in self.seven_passed_cells(owner, from, to, steps) {
                displaced.extend(self.send_home(cell, (owner, marble_idx)));
            }
        }

        match seven_steps {
            Some(steps) => {
                if self.card_active.is_none() {
                    self.card_active = Some(card);
                }
                let remaining = self.seven.budget() - steps;
                self.seven.remaining = Some(remaining);
                self.seven.moves.push(MarbleStep {
                    seat: owner,
                    marble: marble_idx,
                    from,
                    to,
                    was_safe,
                });
                self.seven.displaced.extend(displaced);
                // A pass can still undo this sub-step, so players are only
                // marked finished once the seven is spent or a team is home.
                if remaining == 0 || self.team_home() {
                    self.check_victory();
                }
                if remaining == 0 {
                    self.finish_card(card);
                    self.seven = SevenMove::default();
                    self.end_turn(rng);
                }
            }
            None => {
                self.finish_card(card);
                self.check_victory();
                self.end_turn(rng);
            }
        }
        Ok(())
    }

    /// Cells a moving marble of `colour` may use: it leaves the ring, its own
    /// kennel (onto its start only) or its own lane, and lands on the ring or
    /// in its own lane. A marble in the lane stays there.
    fn check_move_cells(colour: Colour, from: Cell, to: Cell) -> Result<(), GameError> {
        match board::zone(to) {
            Some(Zone::Ring) => {}
            Some(Zone::Finish { colour: lane, .. }) if lane == colour => {}
            _ => return Err(GameError::InvalidCell(to)),
        }
        match board::zone(from) {
            Some(Zone::Ring) => Ok(()),
            Some(Zone::Kennel(kennel)) if kennel == colour => {
                if to == board::layout(colour).start {
                    Ok(())
                } else {
                    Err(GameError::IllegalAction("a marble leaves the kennel onto its start cell"))
                }
            }
            Some(Zone::Finish { colour: lane, .. }) if lane == colour => {
                if board::is_ring(to) {
                    Err(GameError::IllegalAction("a marble cannot leave its finish lane"))
                } else {
                    Ok(())
                }
            }
            _ => Err(GameError::InvalidCell(from)),
        }
    }

    /// Whether some team has all eight marbles in their finish lanes.
    fn team_home(&self) -> bool {
        TEAMS
            .iter()
            .any(|team| team.iter().all(|seat| self.players[*seat].all_in_finish()))
    }

    /// Send every marble on `cell` except `keep` back to its kennel.
    pub(crate) fn send_home(&mut self, cell: Cell, keep: (usize, usize)) -> Vec<Displacement> {
        let mut displaced = Vec::new();
        for seat in 0..self.players.len() {
            for idx in 0..MARBLES_PER_PLAYER {
                if (seat, idx) == keep || self.players[seat].marbles[idx].pos != cell {
                    continue;
                }
                let home = self.players[seat].free_kennel_cell();
                let marble = &mut self.players[seat].marbles[idx];
                let was_safe = marble.safe;
                marble.pos = home;
                marble.safe = false;
                debug!(seat, marble = idx, from = cell, to = home, "marble sent home");
                displaced.push(Displacement {
                    seat,
                    marble: idx,
                    from: cell,
                    was_safe,
                });
            }
        }
        displaced
    }

    /// Discard the card that was just played out and clear the active card.
    pub(crate) fn finish_card(&mut self, card: Card) {
        let from_wildcard = self.wildcard_pending && self.card_active == Some(card);
        if !from_wildcard {
            if let Some(card) = self.players[self.idx_player_active].remove_card(&card) {
                self.discard_pile.push(card);
            }
        }
        self.card_active = None;
        self.wildcard_pending = false;
    }

    fn apply_pass(&mut self, rng: &mut impl Rng) {
        let seat = self.idx_player_active;
        if !self.card_exchanged {
            debug!(seat, "exchange skipped");
            self.advance_exchange(rng);
            return;
        }

        if self.seven.in_progress() {
            self.revert_seven();
            if let Some(card) = self.card_active {
                self.finish_card(card);
            }
            self.seven = SevenMove::default();
            self.end_turn(rng);
            return;
        }

        if self.card_active.take().is_some() {
            self.wildcard_pending = false;
        }
        let hand: Vec<Card> = self.players[seat].hand.drain(..).collect();
        if !hand.is_empty() {
            debug!(seat, cards = hand.len(), "hand discarded");
        }
        self.discard_pile.extend(hand);
        self.end_turn(rng);
    }

    /// Pass the turn to the next seat and start a new round once every hand
    /// is empty.
    pub(crate) fn end_turn(&mut self, rng: &mut impl Rng) {
        if self.phase != GamePhase::Running {
            return;
        }
        self.idx_player_active = (self.idx_player_active + 1) % PLAYER_COUNT;
        self.start_round_if_exhausted(rng);
    }

    fn start_round_if_exhausted(&mut self, rng: &mut impl Rng) {
        let exhausted = self.players.iter().all(|p| p.hand.is_empty())
            && self.exchange_buffer.is_empty()
            && self.card_active.is_none();
        if exhausted {
            self.start_new_round(rng);
        }
    }

    fn start_new_round(&mut self, rng: &mut impl Rng) {
        self.round += 1;
        self.idx_player_started = (self.idx_player_started + 1) % PLAYER_COUNT;
        self.idx_player_active = self.idx_player_started;
        self.card_exchanged = false;
        self.deal(rng);
        info!(
            round = self.round,
            starter = self.idx_player_started,
            hand_size = Self::hand_size_for_round(self.round),
            "new round"
        );
    }

    /// Deal the round's hand size to every seat, starting with the starter.
    /// The discard pile is shuffled back in only when the draw pile runs short.
    fn deal(&mut self, rng: &mut impl Rng) {
        let hand_size = Self::hand_size_for_round(self.round);
        if self.draw_pile.len() < hand_size * PLAYER_COUNT {
            debug!(
                draw = self.draw_pile.len(),
                discard = self.discard_pile.len(),
                "reshuffling discard pile"
            );
            self.draw_pile.append(&mut self.discard_pile);
            self.draw_pile.shuffle(rng);
        }
        for offset in 0..PLAYER_COUNT {
            let seat = (self.idx_player_started + offset) % PLAYER_COUNT;
            for _ in 0..hand_size {
                if let Some(card) = self.draw_pile.pop() {
                    self.players[seat].hand.push(card);
                }
            }
        }
    }

    /// Mark players whose marbles are all home and end the game once a whole
    /// team is finished.
    pub fn check_victory(&mut self) {
        for (seat, player) in self.players.iter_mut().enumerate() {
            if !player.finished && player.all_in_finish() {
                player.finished = true;
                info!(seat, colour = %player.colour, "player finished");
            }
        }
        if let Some(team) = self.winning_team() {
            self.phase = GamePhase::Finished;
            info!(?team, round = self.round, "game finished");
        }
    }

    /// Copy of the state as seen from `seat`: every other hand is emptied.
    pub fn player_view(&self, seat: usize) -> Result<GameState, GameError> {
        if seat >= self.players.len() {
            return Err(GameError::InvalidPlayer(seat));
        }
        let mut view = self.clone();
        for (idx, player) in view.players.iter_mut().enumerate() {
            if idx != seat {
                player.hand.clear();
            }
        }
        view.exchange_buffer
            .retain(|given| given.to == Self::partner(seat));
        Ok(view)
    }
}
