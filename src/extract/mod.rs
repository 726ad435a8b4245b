//! Episode page extraction
//!
//! Turns a parsed episode page into an [`EpisodeRecord`]. The four rounds are
//! extracted independently; a missing section yields an empty round rather
//! than an error, so a fetched page always produces a record.
//!
//! # Components
//!
//! - `dom`: tree navigation helpers shared with listing discovery
//! - `connection`: rounds 1 and 2
//! - `wall`: round 3
//! - `vowels`: round 4
//! - `fallback`: raw-text parsers for pages without structured markup

mod connection;
pub mod dom;
pub mod fallback;
mod vowels;
mod wall;

pub use connection::{classify_clue, extract_clues, parse_connection_round, resolve_label};
pub use vowels::parse_vowels_round;
pub use wall::parse_wall_round;

use crate::model::{EpisodeRecord, EpisodeStub};
use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;

static META_SERIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Series\s*(\d+)").expect("hardcoded regex pattern is valid"));

static META_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Episode\s*(\d+)").expect("hardcoded regex pattern is valid"));

static ROUND_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Round\s*(\d+)").expect("hardcoded regex pattern is valid"));

static ROUND_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^round\d+$").expect("hardcoded regex pattern is valid"));

/// Builds the record for one fetched episode page
pub fn extract_episode(document: &Html, stub: &EpisodeStub) -> EpisodeRecord {
    let mut record = EpisodeRecord::from_stub(stub, Utc::now());

    if record.title.is_empty() {
        if let Some(h1) = dom::find_in_document(document, "h1", None) {
            record.title = dom::clean_text(h1);
        }
    }

    if let Some(meta) = dom::find_in_document(document, "h2", Some("episode_meta")) {
        let text = dom::clean_text(meta);
        if record.series_number.is_none() {
            record.series_number = capture_number(&META_SERIES, &text);
        }
        if record.episode_number.is_none() {
            record.episode_number = capture_number(&META_EPISODE, &text);
        }
    }

    record.round1 = parse_connection_round(document, 1);
    record.round2 = parse_connection_round(document, 2);
    record.round3 = parse_wall_round(document);
    record.round4 = parse_vowels_round(document);

    if record.is_sparse() {
        tracing::debug!("No rounds found on {}", record.url);
    }

    record
}

fn capture_number(pattern: &Regex, text: &str) -> Option<u32> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Finds the `h2` opening round `round`: by `id="roundN"`, else by its text
pub(crate) fn find_round_heading(document: &Html, round: u8) -> Option<ElementRef<'_>> {
    let id = format!("round{round}");
    let headings = dom::find_all(document.root_element(), "h2", None);

    headings
        .iter()
        .find(|h2| h2.value().id() == Some(id.as_str()))
        .or_else(|| {
            headings.iter().find(|h2| {
                capture_number(&ROUND_NUMBER, &dom::clean_text(**h2)) == Some(u32::from(round))
            })
        })
        .copied()
}

/// Siblings after a round heading, up to the next round heading
pub(crate) fn round_section(heading: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    dom::following_siblings(heading).take_while(|e| !is_round_heading(e))
}

/// An `h2` with a `roundN` id or "Round" in its text
fn is_round_heading(element: &ElementRef<'_>) -> bool {
    dom::is_tag(element, "h2")
        && (element.value().id().is_some_and(|id| ROUND_ID.is_match(id))
            || dom::clean_text(*element).contains("Round"))
}
