use crate::*;
pub use shuffle::*;

mod shuffle;

/// Symbols used when no other set is configured.
pub const DEFAULT_SYMBOLS: [&str; 8] = ["🎮", "🎯", "🎨", "🎪", "🎭", "🎬", "🎸", "🎺"];

pub trait DeckGenerator {
    /// Builds `2 * N` cards for `N` distinct symbols, every symbol on exactly two cards.
    fn generate<S: AsRef<str>>(self, symbols: &[S]) -> Vec<Card>;
}

/// Lays out both copies of every symbol with ids `0..2N`, in symbol order.
///
/// Duplicate symbols are dropped and the set is capped at [`MAX_PAIRS`] so the pairing invariant always holds.
pub(crate) fn paired_cards<S: AsRef<str>>(symbols: &[S]) -> Vec<Card> {
    let mut distinct: Vec<&str> = Vec::with_capacity(symbols.len());
    for symbol in symbols.iter().map(AsRef::as_ref) {
        if distinct.contains(&symbol) {
            log::warn!("Duplicate symbol {:?} ignored", symbol);
        } else {
            distinct.push(symbol);
        }
    }

    if distinct.len() > MAX_PAIRS {
        log::warn!(
            "Too many symbols, requested {} but only {} fit",
            distinct.len(),
            MAX_PAIRS
        );
        distinct.truncate(MAX_PAIRS);
    }

    distinct
        .iter()
        .chain(distinct.iter())
        .enumerate()
        .map(|(id, &symbol)| Card::new(id as CardId, symbol))
        .collect()
}
