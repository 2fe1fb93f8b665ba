use crate::*;

/// Renderer-facing state of one card. `symbol` is `None` whenever the face must not show it.
#[derive(Clone, Debug, PartialEq)]
pub struct CardView {
    pub id: CardId,
    pub face: CardFace,
    pub symbol: Option<String>,
}

/// Everything a renderer needs to draw the current mode.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub mode: Mode,
    pub cards: Vec<CardView>,
    pub moves: u32,
    pub matches: PairCount,
    pub total_pairs: PairCount,
    pub elapsed_secs: u32,
    pub processing: bool,
    pub ledger: Vec<LedgerRow>,
    pub last_score: Option<Score>,
}

impl Snapshot {
    pub fn new(mode: Mode, game: &GameState, ledger: &Ledger, last_score: Option<Score>) -> Self {
        let cards = game
            .cards()
            .iter()
            .map(|card| {
                let face = game.face_of(card, mode);
                CardView {
                    id: card.id,
                    face,
                    symbol: face.shows_symbol().then(|| card.symbol.clone()),
                }
            })
            .collect();

        Self {
            mode,
            cards,
            moves: game.moves(),
            matches: game.matches(),
            total_pairs: game.total_pairs(),
            elapsed_secs: game.elapsed_secs(),
            processing: game.is_processing(),
            ledger: ledger.rows(last_score.as_ref()),
            last_score,
        }
    }

    /// Whether clicking `id` could change anything.
    pub fn is_clickable(&self, id: CardId) -> bool {
        !self.processing
            && self
                .cards
                .iter()
                .any(|card| card.id == id && card.face == CardFace::Hidden)
    }
}
