use super::*;

/// Generation strategy that pairs the symbols and then applies a uniform Fisher–Yates shuffle driven by a seeded
/// generator, so the same seed always deals the same deck.
#[derive(Clone, Debug, PartialEq)]
pub struct ShuffledDeckGenerator {
    seed: u64,
}

impl ShuffledDeckGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl DeckGenerator for ShuffledDeckGenerator {
    fn generate<S: AsRef<str>>(self, symbols: &[S]) -> Vec<Card> {
        use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};

        let mut cards = paired_cards(symbols);
        let mut rng = SmallRng::seed_from_u64(self.seed);
        cards.shuffle(&mut rng);
        cards
    }
}
