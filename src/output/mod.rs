//! Output module for crawl summaries and collection statistics
//!
//! This module handles:
//! - The end-of-run summary (saved episodes, artifact paths, failed URLs)
//! - Statistics over the stored collection for `--stats`

pub mod stats;

pub use stats::{collect_statistics, print_statistics, CrawlStatistics};

use crate::crawler::CrawlReport;
use crate::state::CrawlPhase;
use std::path::Path;

/// Prints the summary of a finished or interrupted run
pub fn print_report(report: &CrawlReport, episodes_path: &Path, progress_path: &Path) {
    println!();
    match report.outcome {
        CrawlPhase::Interrupted => println!("=== Crawl Interrupted (progress saved) ==="),
        _ => println!("=== Crawl Complete ==="),
    }

    println!(
        "Episodes this run: {} scraped, {} failed ({} of {} pending attempted)",
        report.succeeded, report.failed_this_run, report.attempted, report.pending
    );
    println!(
        "Saved {} episodes to {}",
        report.total_episodes,
        episodes_path.display()
    );
    println!("Progress index: {}", progress_path.display());

    if !report.failed.is_empty() {
        println!("\nFailed URLs ({}):", report.failed.len());
        for (url, reason) in &report.failed {
            println!("  - {} ({})", url, reason);
        }
    }
}
