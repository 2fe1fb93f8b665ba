use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub symbol: String,
    pub matched: bool,
    /// Set once the symbol has been shown in a pair that did not match.
    pub revealed: bool,
}

impl Card {
    pub fn new(id: CardId, symbol: impl Into<String>) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            matched: false,
            revealed: false,
        }
    }
}

/// How a card should be presented to the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardFace {
    Hidden,
    /// Flipped and showing its symbol.
    FaceUp,
    /// Flipped again in hard mode after an earlier reveal; the symbol stays hidden.
    FaceUpRepeat,
    Matched,
}

impl CardFace {
    pub const fn shows_symbol(self) -> bool {
        matches!(self, Self::FaceUp | Self::Matched)
    }

    pub const fn is_flipped(self) -> bool {
        matches!(self, Self::FaceUp | Self::FaceUpRepeat)
    }
}

impl Default for CardFace {
    fn default() -> Self {
        Self::Hidden
    }
}
