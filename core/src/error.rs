use thiserror::Error;

use crate::CardId;

/// Inconsistencies found while validating a game that was not built by [`GameState::new`](crate::GameState::new).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Deck must hold a positive, even number of cards, got {0}")]
    InvalidDeckSize(usize),
    #[error("Card ids are not a permutation of 0..{0}")]
    InvalidCardIds(usize),
    #[error("Symbol {0:?} does not appear exactly twice")]
    UnpairedSymbol(String),
    #[error("Too many flipped cards: {0}")]
    TooManyFlipped(usize),
    #[error("Flipped card {0} is unknown, duplicated or already matched")]
    InvalidFlipped(CardId),
    #[error("Match count {0} does not agree with the matched cards on the board")]
    MatchCountMismatch(u8),
    #[error("Processing flag does not agree with the flipped cards")]
    ProcessingMismatch,
}

pub type Result<T> = core::result::Result<T, StateError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not decode value stored under {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Could not encode value for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Value stored under {key} is inconsistent: {source}")]
    Invalid {
        key: String,
        #[source]
        source: StateError,
    },
    #[error("Could not write {key}: {reason}")]
    Write { key: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    #[error("Clipboard is not available")]
    Unavailable,
    #[error("Copy was rejected: {0}")]
    Rejected(String),
}
