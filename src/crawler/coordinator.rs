//! Crawl coordinator - main crawl orchestration logic
//!
//! One run walks `Idle → Discovering → (Fetching → Extracting → Recording)*
//! → Checkpointing → Done`. The coordinator exclusively owns the progress
//! index and the record collection; a single worker mutates them between
//! suspension points, so neither needs a lock.
//!
//! Cancellation is cooperative: the flag is checked before each URL, and the
//! final checkpoint is written whichever way the loop ends.

use crate::config::{validate, Config};
use crate::crawler::discovery::IndexDiscoverer;
use crate::crawler::fetcher::{FetchClient, PageSource};
use crate::extract::extract_episode;
use crate::model::{EpisodeRecord, EpisodeStub};
use crate::state::{CrawlPhase, CrawlProgress, EpisodeCollection};
use crate::storage::{JsonFileStore, ProgressStore};
use crate::{HarvestError, Result};
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// Options for a single crawl run
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Process at most this many pending episodes
    pub max_episodes: Option<usize>,

    /// Load existing progress and skip completed episodes
    pub resume: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_episodes: None,
            resume: true,
        }
    }
}

/// Outcome of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// `Done` or `Interrupted`
    pub outcome: CrawlPhase,

    /// Episodes found on the listing
    pub discovered: usize,

    /// Episodes selected for this run after resume filtering and the cap
    pub pending: usize,

    /// Episodes fetched (successfully or not) before the run ended
    pub attempted: usize,
    pub succeeded: usize,
    pub failed_this_run: usize,

    /// Records held after the run, including earlier runs
    pub total_episodes: usize,

    /// Every URL currently recorded as failed, with its reason
    pub failed: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct RunCounters {
    attempted: usize,
    succeeded: usize,
    failed: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator<S = Client, P = JsonFileStore> {
    config: Config,
    options: CrawlOptions,
    fetcher: FetchClient<S>,
    discoverer: IndexDiscoverer,
    store: P,
    progress: CrawlProgress,
    episodes: EpisodeCollection,
    phase: CrawlPhase,
    cancel: Arc<AtomicBool>,
    config_hash: Option<String>,
}

impl Coordinator<Client, JsonFileStore> {
    /// Creates a coordinator backed by reqwest and the JSON artifacts named
    /// in the configuration
    pub fn new(config: Config, options: CrawlOptions, config_hash: Option<String>) -> Result<Self> {
        let fetcher = FetchClient::from_config(&config)?;
        let store = JsonFileStore::from_config(&config.output);
        Self::assemble(config, options, fetcher, store, config_hash)
    }
}

impl<S: PageSource, P: ProgressStore> Coordinator<S, P> {
    /// Creates a coordinator from explicit collaborators
    pub fn with_parts(
        config: Config,
        options: CrawlOptions,
        source: S,
        store: P,
        config_hash: Option<String>,
    ) -> Result<Self> {
        let fetcher = FetchClient::new(source, &config);
        Self::assemble(config, options, fetcher, store, config_hash)
    }

    fn assemble(
        config: Config,
        options: CrawlOptions,
        fetcher: FetchClient<S>,
        store: P,
        config_hash: Option<String>,
    ) -> Result<Self> {
        validate(&config)?;
        let listing_url = Url::parse(&config.listing_url())?;

        Ok(Self {
            config,
            options,
            fetcher,
            discoverer: IndexDiscoverer::new(listing_url),
            store,
            progress: CrawlProgress::new(),
            episodes: EpisodeCollection::new(),
            phase: CrawlPhase::Idle,
            cancel: Arc::new(AtomicBool::new(false)),
            config_hash,
        })
    }

    /// Flag that stops the run before the next URL once set
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn progress(&self) -> &CrawlProgress {
        &self.progress
    }

    pub fn episodes(&self) -> &[EpisodeRecord] {
        self.episodes.records()
    }

    /// Runs the crawl to completion or interruption
    ///
    /// A coordinator runs once; calling this again after the run ended
    /// returns `InvalidTransition`. Per-URL failures are recorded and the crawl moves on. Only an empty
    /// listing is fatal, reported as `NoEpisodesFound` without touching the
    /// stored artifacts.
    pub async fn run(&mut self) -> Result<CrawlReport> {
        if self.phase.is_terminal() {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: CrawlPhase::Discovering,
            });
        }

        if self.options.resume {
            self.load_progress()?;
        } else {
            tracing::info!("Starting fresh crawl, existing artifacts will be overwritten");
        }

        self.transition(CrawlPhase::Discovering)?;
        let stubs = self.discoverer.list_episodes(&mut self.fetcher).await;
        if stubs.is_empty() {
            return Err(HarvestError::NoEpisodesFound {
                listing_url: self.discoverer.listing_url().to_string(),
            });
        }

        let pending = self.select_pending(&stubs);
        tracing::info!(
            "{} episodes listed, {} already completed, {} to scrape",
            stubs.len(),
            stubs
                .iter()
                .filter(|s| self.progress.is_completed(&s.url))
                .count(),
            pending.len()
        );

        let mut counters = RunCounters::default();
        let loop_result = self.crawl_pending(&pending, &mut counters).await;
        let interrupted = matches!(loop_result, Ok(true));

        // Final checkpoint runs regardless of how the loop ended
        if self.phase != CrawlPhase::Checkpointing {
            self.transition(CrawlPhase::Checkpointing)?;
        }
        let checkpoint_result = self.checkpoint();

        loop_result?;
        checkpoint_result?;

        let outcome = if interrupted {
            CrawlPhase::Interrupted
        } else {
            CrawlPhase::Done
        };
        self.transition(outcome)?;

        Ok(CrawlReport {
            outcome,
            discovered: stubs.len(),
            pending: pending.len(),
            attempted: counters.attempted,
            succeeded: counters.succeeded,
            failed_this_run: counters.failed,
            total_episodes: self.episodes.len(),
            failed: self.progress.failed.clone(),
        })
    }

    /// Drops completed URLs, then applies the cap
    fn select_pending(&self, stubs: &[EpisodeStub]) -> Vec<EpisodeStub> {
        let remaining = stubs
            .iter()
            .filter(|stub| !self.progress.is_completed(&stub.url))
            .cloned();

        match self.options.max_episodes {
            Some(max) => remaining.take(max).collect(),
            None => remaining.collect(),
        }
    }

    /// Processes pending episodes in order
    ///
    /// Returns `Ok(true)` if cancellation stopped the loop early.
    async fn crawl_pending(
        &mut self,
        pending: &[EpisodeStub],
        counters: &mut RunCounters,
    ) -> Result<bool> {
        let checkpoint_every = self.config.crawler.checkpoint_every.max(1);

        for (index, stub) in pending.iter().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::warn!(
                    "Interrupted after {} of {} episodes, saving progress",
                    index,
                    pending.len()
                );
                return Ok(true);
            }

            tracing::info!(
                "[{}/{}] Scraping: {} - {}",
                index + 1,
                pending.len(),
                stub.series,
                stub.title
            );
            self.process_episode(stub, counters).await?;

            let is_last = index + 1 == pending.len();
            if counters.attempted % checkpoint_every == 0 && !is_last {
                self.transition(CrawlPhase::Checkpointing)?;
                self.checkpoint()?;
            }
        }

        Ok(false)
    }

    /// Fetches, extracts and records one episode
    async fn process_episode(
        &mut self,
        stub: &EpisodeStub,
        counters: &mut RunCounters,
    ) -> Result<()> {
        self.transition(CrawlPhase::Fetching)?;
        let fetched = self.fetcher.fetch(&stub.url).await;
        counters.attempted += 1;

        match fetched {
            Ok(document) => {
                self.transition(CrawlPhase::Extracting)?;
                let record = extract_episode(&document, stub);

                self.transition(CrawlPhase::Recording)?;
                tracing::info!(
                    "Extracted: R1={}, R2={}, R3={} walls, R4={} clues",
                    record.round1.len(),
                    record.round2.len(),
                    record.round3.len(),
                    record.vowel_clue_count()
                );
                self.progress.mark_completed(&record.url);
                if self.episodes.upsert(record) {
                    tracing::debug!("Replaced existing record for {}", stub.url);
                }
                counters.succeeded += 1;
            }
            Err(e) => {
                self.transition(CrawlPhase::Recording)?;
                tracing::error!("Failed to scrape {}: {}", stub.url, e);
                self.progress.mark_failed(&stub.url, e.reason());
                counters.failed += 1;
            }
        }

        Ok(())
    }

    /// Loads stored progress and records, repairing any disagreement
    fn load_progress(&mut self) -> Result<()> {
        self.progress = self.store.load()?;
        self.episodes = EpisodeCollection::from_records(self.store.load_records()?);

        let reconciliation = self.progress.reconcile(&self.episodes);
        if !reconciliation.is_clean() {
            tracing::warn!(
                "Progress and records disagreed: {} completed URLs without a record will be re-fetched, {} records re-marked completed",
                reconciliation.dropped.len(),
                reconciliation.restored.len()
            );
        }

        if let (Some(stored), Some(current)) = (&self.progress.config_hash, &self.config_hash) {
            if stored != current {
                tracing::warn!("Configuration changed since the last checkpoint");
            }
        }

        tracing::info!(
            "Resuming: {} completed, {} failed",
            self.progress.completed.len(),
            self.progress.failed.len()
        );
        Ok(())
    }

    fn checkpoint(&mut self) -> Result<()> {
        self.progress.config_hash = self.config_hash.clone();
        self.progress.updated_at = Some(chrono::Utc::now());
        self.store.save(&self.progress, self.episodes.records())?;

        tracing::info!(
            "Progress saved: {} completed, {} failed, {} episodes",
            self.progress.completed.len(),
            self.progress.failed.len(),
            self.episodes.len()
        );
        Ok(())
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

/// Runs a crawl with reqwest and the configured JSON artifacts
///
/// Ctrl-C sets the cancellation flag; the episode in flight finishes, a
/// final checkpoint is written, and the report's outcome is `Interrupted`.
///
/// # Example
///
/// ```no_run
/// use ocdb_harvest::config::load_config_with_hash;
/// use ocdb_harvest::crawler::{run_crawl, CrawlOptions};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("harvest.toml"))?;
/// let report = run_crawl(config, CrawlOptions::default(), Some(hash)).await?;
/// println!("{} episodes saved", report.total_episodes);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    options: CrawlOptions,
    config_hash: Option<String>,
) -> Result<CrawlReport> {
    let mut coordinator = Coordinator::new(config, options, config_hash)?;

    let cancel = coordinator.cancel_flag();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current episode");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let result = coordinator.run().await;
    signal.abort();
    result
}
