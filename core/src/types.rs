use serde::{Deserialize, Serialize};

/// Identifier of a card inside one deck, assigned `0..2N` before shuffling.
pub type CardId = u8;

/// Count type used for pairs on the board and pairs matched so far.
pub type PairCount = u8;

/// Largest number of distinct symbols a deck can hold while ids still fit in [`CardId`].
pub const MAX_PAIRS: usize = (CardId::MAX as usize + 1) / 2;

/// Difficulty variant. Each mode owns its own game and ledger.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[serde(alias = "light")]
    Normal,
    /// Hides the symbol of a card that is flipped again after it was already seen.
    #[serde(alias = "dark")]
    Hard,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Normal, Mode::Hard];

    pub const fn name(self) -> &'static str {
        use Mode::*;
        match self {
            Normal => "normal",
            Hard => "hard",
        }
    }

    pub const fn title(self) -> &'static str {
        use Mode::*;
        match self {
            Normal => "Memory Game",
            Hard => "Hard Mode",
        }
    }

    pub const fn hides_repeat_reveals(self) -> bool {
        matches!(self, Self::Hard)
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Hard => 1,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::Normal
    }
}
