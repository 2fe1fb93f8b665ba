//! Rules of a two-mode card-pairs memory game: dealing, flipping, resolving pairs, ranking scores, and the session
//! that sequences them for a presentation layer.

pub use card::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use ledger::*;
pub use session::*;
pub use share::*;
pub use storage::*;
pub use types::*;
pub use view::*;

mod card;
mod engine;
mod error;
mod generator;
mod ledger;
mod session;
mod share;
mod storage;
mod types;
mod view;
