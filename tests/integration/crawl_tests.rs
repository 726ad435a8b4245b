//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small episode archive and run the
//! full discover, fetch, extract and checkpoint cycle end-to-end.

use ocdb_harvest::config::Config;
use ocdb_harvest::crawler::{Coordinator, CrawlOptions};
use ocdb_harvest::model::Clue;
use ocdb_harvest::storage::{JsonFileStore, ProgressStore};
use ocdb_harvest::{CrawlPhase, HarvestError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const LISTING: &str = r#"<html><body>
    <div class="episode-list">
        <h2>Series 1</h2>
        <ul>
            <li><a href="/episode/1/">Episode 1: Crossworders vs Rugby Fans</a></li>
            <li><a href="/episode/2/">Episode 2: Cricketers vs Quizzers</a></li>
        </ul>
    </div>
</body></html>"#;

const EPISODE: &str = r#"<html><body>
    <h1>Crossworders vs Rugby Fans</h1>
    <h2 class="episode_meta">Series 1, Episode 1</h2>
    <h2 id="round1">Round 1: What's the Connection?</h2>
    <h3>Two Reeds</h3>
    <div class="round">
        <div class="clue"><a href="/media/theme.mp3">Play</a></div>
        <div class="clue">Clue 2</div>
        <div class="answer"><div class="card"><div class="back">Theme tunes</div></div></div>
    </div>
    <h2 id="round2">Round 2: What Comes Fourth?</h2>
    <h2 id="round3">Round 3: Connecting Walls</h2>
    <h3>Lion</h3>
    <div class="question"><div class="wall-container">
        <div class="group1-clue"><div class="clue">Ant</div></div>
        <label class="group1-answer"><div class="back">Insects</div></label>
    </div></div>
    <h2 id="round4">Round 4: Missing Vowels</h2>
    <div class="vowel-round">
        <div class="category">Trees</div>
        <div class="missing-vowels"><div class="card"><div class="front">SH</div><div class="back">Ash</div></div></div>
    </div>
</body></html>"#;

/// Creates a fast test configuration pointed at the mock server
fn create_test_config(base_url: &str, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = base_url.to_string();
    config.crawler.listing_path = "/episodes/".to_string();
    config.crawler.max_retries = 2;
    config.crawler.request_timeout_secs = 5;
    config.crawler.checkpoint_every = 10;
    config.rate_limit.min_delay_ms = 1;
    config.rate_limit.max_delay_ms = 5;
    config.rate_limit.max_jitter_ms = 0;
    config.output.episodes_path = dir
        .path()
        .join("episodes.json")
        .to_string_lossy()
        .into_owned();
    config.output.progress_path = dir
        .path()
        .join("progress.json")
        .to_string_lossy()
        .into_owned();
    config
}

fn store_for(config: &Config) -> JsonFileStore {
    JsonFileStore::from_config(&config.output)
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: &str, calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_records_both_episodes() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/episodes/", 200, LISTING, 1).await;
    mount_page(&mock_server, "/episode/1/", 200, EPISODE, 1).await;
    mount_page(&mock_server, "/episode/2/", 200, EPISODE, 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &dir);
    let store = store_for(&config);

    let mut coordinator = Coordinator::new(config, CrawlOptions::default(), None)
        .expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.outcome, CrawlPhase::Done);
    assert_eq!(report.discovered, 2);
    assert_eq!(report.succeeded, 2);
    assert!(report.failed.is_empty());

    let records = store.load_records().expect("Failed to load records");
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.series == "Series 1"));
    assert_eq!(records[1].title, "Cricketers vs Quizzers");
    assert_eq!(records[1].episode_number, Some(2));
    assert_eq!(records[1].series_number, Some(1));

    let round1 = &records[0].round1;
    assert_eq!(round1.len(), 1);
    assert_eq!(round1[0].label, "Two Reeds");
    assert_eq!(
        round1[0].clues,
        vec![Clue::Audio {
            url: "/media/theme.mp3".to_string()
        }]
    );
    assert_eq!(round1[0].answer, "Theme tunes");
    assert!(records[0].round2.is_empty());
    assert_eq!(records[0].round3[0].groups.len(), 4);
    assert_eq!(records[0].vowel_clue_count(), 1);

    let progress = store.load().expect("Failed to load progress");
    assert_eq!(progress.completed.len(), 2);
    assert!(progress.updated_at.is_some());
}

#[tokio::test]
async fn test_resume_fetches_no_completed_episode() {
    let mock_server = MockServer::start().await;
    // Listing is read by both runs, each episode only by the first
    mount_page(&mock_server, "/episodes/", 200, LISTING, 2).await;
    mount_page(&mock_server, "/episode/1/", 200, EPISODE, 1).await;
    mount_page(&mock_server, "/episode/2/", 200, EPISODE, 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &dir);

    let mut first = Coordinator::new(config.clone(), CrawlOptions::default(), None)
        .expect("Failed to create coordinator");
    first.run().await.expect("First crawl failed");

    let mut second = Coordinator::new(config.clone(), CrawlOptions::default(), None)
        .expect("Failed to create coordinator");
    let report = second.run().await.expect("Second crawl failed");

    assert_eq!(report.pending, 0);
    assert_eq!(report.attempted, 0);
    assert_eq!(report.total_episodes, 2);

    let records = store_for(&config).load_records().unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_max_episodes_caps_the_run() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/episodes/", 200, LISTING, 1).await;
    mount_page(&mock_server, "/episode/1/", 200, EPISODE, 1).await;
    mount_page(&mock_server, "/episode/2/", 200, EPISODE, 0).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &dir);

    let options = CrawlOptions {
        max_episodes: Some(1),
        resume: true,
    };
    let mut coordinator = Coordinator::new(config, options, None).unwrap();
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.discovered, 2);
    assert_eq!(report.pending, 1);
    assert_eq!(report.total_episodes, 1);
}

#[tokio::test]
async fn test_failed_episodes_are_recorded_and_crawl_continues() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/episodes/", 200, LISTING, 1).await;
    // 404 is not retried, 503 is retried up to max_retries
    mount_page(&mock_server, "/episode/1/", 404, "gone", 1).await;
    mount_page(&mock_server, "/episode/2/", 503, "busy", 2).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &dir);
    let base = mock_server.uri();

    let mut coordinator = Coordinator::new(config.clone(), CrawlOptions::default(), None).unwrap();
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.outcome, CrawlPhase::Done);
    assert_eq!(report.failed_this_run, 2);
    assert_eq!(report.total_episodes, 0);

    let progress = store_for(&config).load().unwrap();
    assert!(progress.completed.is_empty());
    assert_eq!(
        progress.failed.get(&format!("{}/episode/1/", base)).map(String::as_str),
        Some("http-404")
    );
    assert_eq!(
        progress.failed.get(&format!("{}/episode/2/", base)).map(String::as_str),
        Some("exhausted: http-503")
    );
}

#[tokio::test]
async fn test_failed_episode_is_retried_on_resume() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/episodes/", 200, LISTING, 1).await;
    mount_page(&mock_server, "/episode/1/", 200, EPISODE, 1).await;
    mount_page(&mock_server, "/episode/2/", 200, EPISODE, 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &dir);
    let base = mock_server.uri();

    // A previous run failed episode 2
    let store = store_for(&config);
    let mut progress = ocdb_harvest::CrawlProgress::new();
    progress.mark_failed(&format!("{}/episode/2/", base), "http-404");
    store.save(&progress, &[]).unwrap();

    let mut coordinator = Coordinator::new(config, CrawlOptions::default(), None).unwrap();
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.succeeded, 2);
    assert!(report.failed.is_empty());
    assert!(store.load().unwrap().failed.is_empty());
}

#[tokio::test]
async fn test_no_resume_refetches_everything() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/episodes/", 200, LISTING, 2).await;
    mount_page(&mock_server, "/episode/1/", 200, EPISODE, 2).await;
    mount_page(&mock_server, "/episode/2/", 200, EPISODE, 2).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &dir);

    let mut first = Coordinator::new(config.clone(), CrawlOptions::default(), None).unwrap();
    first.run().await.expect("First crawl failed");

    let options = CrawlOptions {
        max_episodes: None,
        resume: false,
    };
    let mut second = Coordinator::new(config.clone(), options, None).unwrap();
    let report = second.run().await.expect("Second crawl failed");

    assert_eq!(report.attempted, 2);
    assert_eq!(store_for(&config).load_records().unwrap().len(), 2);
}

#[tokio::test]
async fn test_interrupted_run_checkpoints_and_exits_cleanly() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/episodes/", 200, LISTING, 1).await;
    mount_page(&mock_server, "/episode/1/", 200, EPISODE, 0).await;
    mount_page(&mock_server, "/episode/2/", 200, EPISODE, 0).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &dir);

    let mut coordinator = Coordinator::new(config.clone(), CrawlOptions::default(), None).unwrap();
    coordinator.cancel_flag().store(true, Ordering::SeqCst);
    let report = coordinator.run().await.expect("Interrupted crawl should not fail");

    assert_eq!(report.outcome, CrawlPhase::Interrupted);
    assert_eq!(report.attempted, 0);
    assert!(std::path::Path::new(&config.output.progress_path).exists());
    assert!(std::path::Path::new(&config.output.episodes_path).exists());
}

/// Serves an episode page and raises the cancellation flag, as Ctrl-C
/// arriving while that episode is in flight would
struct CancelWhileServing {
    cancel: Arc<AtomicBool>,
}

impl Respond for CancelWhileServing {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.cancel.store(true, Ordering::SeqCst);
        ResponseTemplate::new(200)
            .set_body_string(EPISODE)
            .insert_header("content-type", "text/html")
    }
}

#[tokio::test]
async fn test_cancel_mid_run_keeps_finished_episode() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/episodes/", 200, LISTING, 1).await;
    mount_page(&mock_server, "/episode/2/", 200, EPISODE, 0).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &dir);
    let base = mock_server.uri();

    let mut coordinator = Coordinator::new(config.clone(), CrawlOptions::default(), None).unwrap();
    Mock::given(method("GET"))
        .and(path("/episode/1/"))
        .respond_with(CancelWhileServing {
            cancel: coordinator.cancel_flag(),
        })
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = coordinator.run().await.expect("Interrupted crawl should not fail");

    assert_eq!(report.outcome, CrawlPhase::Interrupted);
    assert_eq!(report.attempted, 1);
    assert_eq!(report.succeeded, 1);

    let store = store_for(&config);
    let first_url = format!("{}/episode/1/", base);
    let records = store.load_records().expect("Failed to load records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, first_url);

    let progress = store.load().expect("Failed to load progress");
    assert!(progress.is_completed(&first_url));
    assert!(!progress.is_completed(&format!("{}/episode/2/", base)));
}

#[tokio::test]
async fn test_missing_listing_is_no_episodes_found() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/episodes/", 404, "not here", 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&mock_server.uri(), &dir);

    let mut coordinator = Coordinator::new(config.clone(), CrawlOptions::default(), None).unwrap();
    let result = coordinator.run().await;

    assert!(matches!(result, Err(HarvestError::NoEpisodesFound { .. })));
    assert!(!std::path::Path::new(&config.output.progress_path).exists());
}
