use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of scores kept per mode.
pub const LEDGER_CAPACITY: usize = 10;

/// Result of one completed game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub moves: u32,
    /// Whole seconds from first flip to the final match.
    pub time: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Score {
    pub fn new(moves: u32, time: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            moves,
            time,
            timestamp,
        }
    }

    /// Fewer moves rank first, then less time.
    pub const fn rank_key(&self) -> (u32, u32) {
        (self.moves, self.time)
    }

    pub fn beats(&self, other: &Score) -> bool {
        self.rank_key() < other.rank_key()
    }
}

/// Top scores of one mode, best first. Stored as a plain list; loading re-ranks and trims it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Score>", into = "Vec<Score>")]
pub struct Ledger {
    scores: Vec<Score>,
}

impl From<Vec<Score>> for Ledger {
    fn from(scores: Vec<Score>) -> Self {
        Self::from_scores(scores)
    }
}

impl From<Ledger> for Vec<Score> {
    fn from(ledger: Ledger) -> Self {
        ledger.scores
    }
}

/// One line of the high-score table.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LedgerRow {
    pub rank: usize,
    pub score: Score,
    /// The row is the most recently completed game.
    pub highlighted: bool,
}

impl Ledger {
    /// Builds a ledger from arbitrary scores, ranking and trimming them.
    pub fn from_scores(scores: Vec<Score>) -> Self {
        let mut ledger = Self { scores };
        ledger.normalize();
        ledger
    }

    pub fn scores(&self) -> &[Score] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn best(&self) -> Option<&Score> {
        self.scores.first()
    }

    /// Inserts `score` and reports whether it beats the best entry held before the insertion. An empty ledger always
    /// reports a new best.
    pub fn record_score(&mut self, score: Score) -> bool {
        let is_new_best = self.best().is_none_or(|best| score.beats(best));
        self.scores.push(score);
        self.normalize();
        is_new_best
    }

    pub fn rows(&self, last: Option<&Score>) -> Vec<LedgerRow> {
        self.scores
            .iter()
            .enumerate()
            .map(|(i, score)| LedgerRow {
                rank: i + 1,
                score: *score,
                highlighted: last == Some(score),
            })
            .collect()
    }

    /// Stable sort, so equal scores keep their insertion order.
    fn normalize(&mut self) {
        self.scores.sort_by_key(Score::rank_key);
        self.scores.truncate(LEDGER_CAPACITY);
    }
}
