use crate::state::EpisodeCollection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Durable crawl progress: which URLs are done and which failed last time
///
/// Owned and mutated only by the coordinator, once per fetch attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlProgress {
    /// URLs whose record is in the episode collection
    #[serde(default)]
    pub completed: BTreeSet<String>,

    /// URL → reason of the most recent failure
    #[serde(default)]
    pub failed: BTreeMap<String, String>,

    /// Hash of the configuration file the last checkpoint was written with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    /// When the last checkpoint was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Changes made while reconciling progress with the stored records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Completed URLs with no record; they will be fetched again
    pub dropped: Vec<String>,

    /// Recorded URLs missing from the completed set; now marked completed
    pub restored: Vec<String>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.restored.is_empty()
    }
}

impl CrawlProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self, url: &str) -> bool {
        self.completed.contains(url)
    }

    /// Marks a URL completed, clearing any earlier failure
    pub fn mark_completed(&mut self, url: &str) {
        self.failed.remove(url);
        self.completed.insert(url.to_string());
    }

    /// Records the latest failure reason for a URL
    pub fn mark_failed(&mut self, url: &str, reason: impl Into<String>) {
        self.failed.insert(url.to_string(), reason.into());
    }

    /// Repairs the window between writing the progress index and the records
    ///
    /// The records are the source of truth: a crash after one artifact was
    /// written but before the other leaves them disagreeing, and the next run
    /// re-derives the completed set from what was actually recorded.
    pub fn reconcile(&mut self, episodes: &EpisodeCollection) -> Reconciliation {
        let mut report = Reconciliation::default();

        self.completed.retain(|url| {
            let keep = episodes.contains(url);
            if !keep {
                report.dropped.push(url.clone());
            }
            keep
        });

        for record in episodes.records() {
            if self.completed.insert(record.url.clone()) {
                report.restored.push(record.url.clone());
            }
            self.failed.remove(&record.url);
        }

        report
    }
}
