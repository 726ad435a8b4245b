//! Episode listing discovery
//!
//! Walks the listing page's series headers and episode links in document
//! order. Every link is attributed to the most recent `Series ...` header.

use crate::crawler::fetcher::{FetchClient, PageSource};
use crate::extract::dom;
use crate::model::EpisodeStub;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static EPISODE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Episode\s*(\d+)").expect("hardcoded regex pattern is valid"));

static EPISODE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Episode\s*\d+:\s*").expect("hardcoded regex pattern is valid"));

/// Lists the episodes of the archive from its listing page
#[derive(Debug, Clone)]
pub struct IndexDiscoverer {
    listing_url: Url,
}

impl IndexDiscoverer {
    pub fn new(listing_url: Url) -> Self {
        Self { listing_url }
    }

    pub fn listing_url(&self) -> &Url {
        &self.listing_url
    }

    /// Fetches the listing and returns its episodes
    ///
    /// A listing that cannot be fetched yields an empty list; the caller
    /// reports that as "no episodes found".
    pub async fn list_episodes<S: PageSource>(
        &self,
        fetcher: &mut FetchClient<S>,
    ) -> Vec<EpisodeStub> {
        tracing::info!("Fetching episode list from {}", self.listing_url);

        let document = match fetcher.fetch(self.listing_url.as_str()).await {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("Failed to fetch episode list: {}", e);
                return Vec::new();
            }
        };

        let episodes = parse_listing(&document, &self.listing_url);
        tracing::info!("Found {} episodes", episodes.len());
        episodes
    }
}

/// Extracts episode stubs from a listing document
///
/// Searches `div.episode-list`, then `div.content`, then the whole page.
/// Links before the first series header are ignored, as are links that do
/// not point at an `/episode/` page. Duplicate URLs keep their first entry.
pub fn parse_listing(document: &Html, base_url: &Url) -> Vec<EpisodeStub> {
    let container = dom::find_in_document(document, "div", Some("episode-list"))
        .or_else(|| dom::find_in_document(document, "div", Some("content")))
        .unwrap_or_else(|| document.root_element());

    let mut episodes = Vec::new();
    let mut seen = HashSet::new();
    let mut current_series: Option<String> = None;

    for element in dom::descendants(container) {
        if dom::is_tag(&element, "h2") {
            let text = dom::clean_text(element);
            if text.starts_with("Series") {
                tracing::trace!("Series header: {}", text);
                current_series = Some(text);
            }
        } else if dom::is_tag(&element, "a") {
            let Some(series) = current_series.as_deref() else {
                continue;
            };
            let Some(stub) = parse_episode_link(element, series, base_url) else {
                continue;
            };
            if seen.insert(stub.url.clone()) {
                episodes.push(stub);
            }
        }
    }

    episodes
}

fn parse_episode_link(link: ElementRef<'_>, series: &str, base_url: &Url) -> Option<EpisodeStub> {
    let href = dom::attr(&link, "href")?;
    if !href.contains("/episode/") {
        return None;
    }

    let url = base_url.join(href.trim()).ok()?;
    let text = dom::clean_text(link);

    let episode_number = EPISODE_NUMBER
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok());

    let title = EPISODE_PREFIX.replace(&text, "").trim().to_string();

    Some(EpisodeStub {
        url: url.to_string(),
        series: series.to_string(),
        episode_number,
        title,
    })
}
