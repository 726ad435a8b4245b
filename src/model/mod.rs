//! Episode data model
//!
//! Records produced by the extractor and persisted by the record store.
//!
//! # Components
//!
//! - `EpisodeStub`: one listing entry (URL plus listing-derived metadata)
//! - `EpisodeRecord`: one fully scraped episode page
//! - Round types: connection questions, walls, and missing-vowels categories

mod episode;
mod rounds;

pub use episode::{EpisodeRecord, EpisodeStub};
pub use rounds::{Clue, ConnectionQuestion, VowelCategory, VowelClue, Wall, WallGroup};
