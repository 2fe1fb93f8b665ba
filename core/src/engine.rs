use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Result of a flip attempt.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlipOutcome {
    NoChange,
    Flipped,
    /// Second card of a pair-attempt is up; the board is locked until [`GameState::resolve`].
    PairFlipped,
}

impl FlipOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Result of resolving the two face-up cards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ResolveOutcome {
    NoChange,
    Mismatch,
    Matched,
    Completed,
}

impl ResolveOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// One game of pairs: the shuffled deck plus the progress made on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    cards: Vec<Card>,
    flipped: SmallVec<[CardId; 2]>,
    moves: u32,
    matches: PairCount,
    processing: bool,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    started_at: Option<DateTime<Utc>>,
    elapsed_secs: u32,
}

impl GameState {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards,
            flipped: SmallVec::new(),
            moves: 0,
            matches: 0,
            processing: false,
            started_at: None,
            elapsed_secs: 0,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn flipped(&self) -> &[CardId] {
        &self.flipped
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn matches(&self) -> PairCount {
        self.matches
    }

    pub fn total_pairs(&self) -> PairCount {
        (self.cards.len() / 2) as PairCount
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn is_complete(&self) -> bool {
        self.matches == self.total_pairs()
    }

    pub fn is_flipped(&self, id: CardId) -> bool {
        self.flipped.contains(&id)
    }

    /// Turns a card face up. Ignored while a pair awaits resolution, and for unknown, matched or already flipped
    /// cards.
    pub fn flip(&mut self, id: CardId, now: DateTime<Utc>) -> FlipOutcome {
        if self.processing || self.is_flipped(id) {
            return FlipOutcome::NoChange;
        }

        match self.card(id) {
            Some(card) if !card.matched => {}
            _ => return FlipOutcome::NoChange,
        }

        self.flipped.push(id);
        self.started_at.get_or_insert(now);

        if self.flipped.len() == 2 {
            self.moves = self.moves.saturating_add(1);
            self.processing = true;
            FlipOutcome::PairFlipped
        } else {
            FlipOutcome::Flipped
        }
    }

    /// Compares the two face-up cards and unlocks the board. Only meaningful with exactly two cards flipped.
    pub fn resolve(&mut self, now: DateTime<Utc>) -> ResolveOutcome {
        let &[first, second] = self.flipped.as_slice() else {
            return ResolveOutcome::NoChange;
        };

        let is_match = match (self.card(first), self.card(second)) {
            (Some(a), Some(b)) => a.symbol == b.symbol,
            _ => false,
        };

        for card in self
            .cards
            .iter_mut()
            .filter(|card| card.id == first || card.id == second)
        {
            if is_match {
                card.matched = true;
            } else {
                card.revealed = true;
            }
        }

        self.flipped.clear();
        self.processing = false;

        if !is_match {
            return ResolveOutcome::Mismatch;
        }

        self.matches = self.matches.saturating_add(1);
        if self.is_complete() {
            self.elapsed_secs = self.elapsed_secs_at(now);
            ResolveOutcome::Completed
        } else {
            ResolveOutcome::Matched
        }
    }

    /// Refreshes the displayed elapsed time. Returns whether the value changed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.started_at.is_none() || self.is_complete() {
            return false;
        }

        let elapsed_secs = self.elapsed_secs_at(now);
        if elapsed_secs == self.elapsed_secs {
            false
        } else {
            self.elapsed_secs = elapsed_secs;
            true
        }
    }

    /// Whole seconds since the first flip, or zero before it.
    pub fn elapsed_secs_at(&self, now: DateTime<Utc>) -> u32 {
        self.started_at.map_or(0, |started_at| {
            (now - started_at).num_seconds().clamp(0, u32::MAX as i64) as u32
        })
    }

    pub fn face_of(&self, card: &Card, mode: Mode) -> CardFace {
        if card.matched {
            CardFace::Matched
        } else if !self.is_flipped(card.id) {
            CardFace::Hidden
        } else if mode.hides_repeat_reveals() && card.revealed {
            CardFace::FaceUpRepeat
        } else {
            CardFace::FaceUp
        }
    }

    /// Checks the invariants that [`GameState::new`] and the transitions uphold, for games loaded from storage.
    pub fn validate(&self) -> Result<()> {
        let len = self.cards.len();
        if len == 0 || len % 2 != 0 || len / 2 > MAX_PAIRS {
            return Err(StateError::InvalidDeckSize(len));
        }

        let mut seen = vec![false; len];
        for card in &self.cards {
            match seen.get_mut(card.id as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(StateError::InvalidCardIds(len)),
            }
        }

        for card in &self.cards {
            let twins = self
                .cards
                .iter()
                .filter(|other| other.symbol == card.symbol)
                .collect::<SmallVec<[&Card; 2]>>();
            if twins.len() != 2 || twins[0].matched != twins[1].matched {
                return Err(StateError::UnpairedSymbol(card.symbol.clone()));
            }
        }

        if self.flipped.len() > 2 {
            return Err(StateError::TooManyFlipped(self.flipped.len()));
        }

        for (i, &id) in self.flipped.iter().enumerate() {
            let valid = self.card(id).is_some_and(|card| !card.matched)
                && !self.flipped[..i].contains(&id);
            if !valid {
                return Err(StateError::InvalidFlipped(id));
            }
        }

        let matched_pairs = self.cards.iter().filter(|card| card.matched).count() / 2;
        if matched_pairs != self.matches as usize {
            return Err(StateError::MatchCountMismatch(self.matches));
        }

        if self.processing != (self.flipped.len() == 2) {
            return Err(StateError::ProcessingMismatch);
        }

        Ok(())
    }
}
