use crate::model::rounds::{ConnectionQuestion, VowelCategory, Wall};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SERIES_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Series\s*(\d+)").expect("hardcoded regex pattern is valid"));

/// One entry of the episode listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeStub {
    /// Absolute URL of the episode page
    pub url: String,

    /// Series header the link appeared under (e.g. "Series 7")
    pub series: String,

    /// Episode number parsed from the link text
    pub episode_number: Option<u32>,

    /// Link text with any "Episode N:" prefix removed
    pub title: String,
}

/// One scraped episode page
///
/// Records are never edited once appended to the collection; a fresh crawl of
/// the same URL replaces the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub url: String,
    pub series: String,
    #[serde(default)]
    pub series_number: Option<u32>,
    #[serde(default)]
    pub episode_number: Option<u32>,
    pub title: String,
    pub scraped_at: DateTime<Utc>,
    #[serde(default)]
    pub round1: Vec<ConnectionQuestion>,
    #[serde(default)]
    pub round2: Vec<ConnectionQuestion>,
    #[serde(default)]
    pub round3: Vec<Wall>,
    #[serde(default)]
    pub round4: Vec<VowelCategory>,
}

impl EpisodeRecord {
    /// Starts a record from listing metadata, with every round empty
    pub fn from_stub(stub: &EpisodeStub, scraped_at: DateTime<Utc>) -> Self {
        Self {
            url: stub.url.clone(),
            series: stub.series.clone(),
            series_number: series_number_from_label(&stub.series),
            episode_number: stub.episode_number,
            title: stub.title.clone(),
            scraped_at,
            round1: Vec::new(),
            round2: Vec::new(),
            round3: Vec::new(),
            round4: Vec::new(),
        }
    }

    /// Total number of missing-vowels clues across all categories
    pub fn vowel_clue_count(&self) -> usize {
        self.round4.iter().map(|c| c.clues.len()).sum()
    }

    /// Returns true if none of the four rounds yielded anything
    pub fn is_sparse(&self) -> bool {
        self.round1.is_empty()
            && self.round2.is_empty()
            && self.round3.is_empty()
            && self.round4.is_empty()
    }
}

/// Extracts N from a "Series N" label; specials and other labels yield None
pub fn series_number_from_label(label: &str) -> Option<u32> {
    SERIES_NUMBER
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
