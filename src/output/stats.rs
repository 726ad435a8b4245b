//! Statistics over the stored episode collection
//!
//! Computed from the saved artifacts alone, so `--stats` needs no network.

use crate::model::{EpisodeRecord, WallGroup};
use crate::state::CrawlProgress;
use std::collections::BTreeMap;

/// Collection statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Number of stored episode records
    pub total_episodes: usize,

    /// Records per series label
    pub episodes_by_series: BTreeMap<String, usize>,

    pub round1_questions: usize,
    pub round2_questions: usize,
    pub walls: usize,
    pub vowel_categories: usize,
    pub vowel_clues: usize,

    /// Walls that are not four groups of four items with a connection
    pub incomplete_walls: usize,

    /// Wall groups and vowel categories kept as unparsed text
    pub raw_fallbacks: usize,

    /// Records where no round was found at all
    pub sparse_episodes: usize,

    pub completed_urls: usize,

    /// Failed URLs with their last reason
    pub failed: BTreeMap<String, String>,
}

/// Computes statistics from a progress index and its records
pub fn collect_statistics(progress: &CrawlProgress, records: &[EpisodeRecord]) -> CrawlStatistics {
    let mut stats = CrawlStatistics {
        total_episodes: records.len(),
        completed_urls: progress.completed.len(),
        failed: progress.failed.clone(),
        ..Default::default()
    };

    for record in records {
        *stats
            .episodes_by_series
            .entry(record.series.clone())
            .or_insert(0) += 1;

        stats.round1_questions += record.round1.len();
        stats.round2_questions += record.round2.len();
        stats.walls += record.round3.len();
        stats.vowel_categories += record.round4.len();
        stats.vowel_clues += record.vowel_clue_count();

        stats.incomplete_walls += record.round3.iter().filter(|w| !w.is_complete()).count();
        stats.raw_fallbacks += record
            .round3
            .iter()
            .flat_map(|w| &w.groups)
            .filter(|g| matches!(g, WallGroup::Raw { .. }))
            .count();
        stats.raw_fallbacks += record
            .round4
            .iter()
            .filter(|c| c.raw_text.is_some())
            .count();

        if record.is_sparse() {
            stats.sparse_episodes += 1;
        }
    }

    stats
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Collection Statistics ===\n");

    println!("Overview:");
    println!("  Episodes stored: {}", stats.total_episodes);
    println!("  Completed URLs: {}", stats.completed_urls);
    println!("  Failed URLs: {}", stats.failed.len());
    println!();

    if !stats.episodes_by_series.is_empty() {
        println!("Episodes by Series:");
        for (series, count) in &stats.episodes_by_series {
            println!("  {}: {}", series, count);
        }
        println!();
    }

    println!("Rounds:");
    println!("  Round 1 questions: {}", stats.round1_questions);
    println!("  Round 2 questions: {}", stats.round2_questions);
    println!(
        "  Round 3 walls: {} ({} incomplete)",
        stats.walls, stats.incomplete_walls
    );
    println!(
        "  Round 4 categories: {} ({} clues)",
        stats.vowel_categories, stats.vowel_clues
    );
    println!();

    println!("Extraction Quality:");
    println!("  Raw-text fallbacks: {}", stats.raw_fallbacks);
    println!("  Episodes with no rounds: {}", stats.sparse_episodes);

    if !stats.failed.is_empty() {
        println!();
        println!("Failed URLs ({}):", stats.failed.len());
        for (url, reason) in &stats.failed {
            println!("  - {} ({})", url, reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EpisodeStub, VowelCategory, VowelClue, Wall};
    use chrono::Utc;

    fn record(url: &str, series: &str) -> EpisodeRecord {
        EpisodeRecord::from_stub(
            &EpisodeStub {
                url: url.to_string(),
                series: series.to_string(),
                episode_number: None,
                title: String::new(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_collect_statistics() {
        let mut first = record("https://ocdb.cc/episode/1/", "Series 1");
        first.round3.push(Wall {
            label: "Lion".to_string(),
            groups: vec![
                WallGroup::structured(vec!["a".into(); 4], "A"),
                WallGroup::Raw {
                    raw_text: "b c".to_string(),
                },
            ],
        });
        first.round4.push(VowelCategory::new(
            "Trees",
            vec![VowelClue::new("SH", "Ash"), VowelClue::new("K", "Oak")],
        ));
        first.round4.push(VowelCategory::raw("unparsed"));

        let second = record("https://ocdb.cc/episode/2/", "Series 1");
        let third = record("https://ocdb.cc/episode/3/", "Series 2");

        let mut progress = CrawlProgress::new();
        for r in [&first, &second, &third] {
            progress.mark_completed(&r.url);
        }
        progress.mark_failed("https://ocdb.cc/episode/4/", "http-404");

        let stats = collect_statistics(&progress, &[first, second, third]);

        assert_eq!(stats.total_episodes, 3);
        assert_eq!(stats.episodes_by_series.get("Series 1"), Some(&2));
        assert_eq!(stats.episodes_by_series.get("Series 2"), Some(&1));
        assert_eq!(stats.walls, 1);
        assert_eq!(stats.incomplete_walls, 1);
        assert_eq!(stats.vowel_categories, 2);
        assert_eq!(stats.vowel_clues, 2);
        assert_eq!(stats.raw_fallbacks, 2);
        assert_eq!(stats.sparse_episodes, 2);
        assert_eq!(stats.completed_urls, 3);
        assert_eq!(stats.failed.len(), 1);
    }

    #[test]
    fn test_empty_collection() {
        let stats = collect_statistics(&CrawlProgress::new(), &[]);
        assert_eq!(stats, CrawlStatistics::default());
    }
}
