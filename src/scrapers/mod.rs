//! Crawl strategies and the session they share.
//!
//! Every source is crawled with one of three strategies, chosen by
//! [`SourceKind`] in the source's configuration:
//!
//! | Kind | Module | Discovery | Record |
//! |------|--------|-----------|--------|
//! | `rss` | [`rss`] | RSS 2.0 `channel/item` | [`Article`](crate::models::Article) |
//! | `html` | [`html`] | links on an index page | [`Article`](crate::models::Article) |
//! | `glossary` | [`glossary`] | inline entries or linked pages | [`GlossaryEntry`](crate::models::GlossaryEntry) |
//!
//! # Common Patterns
//!
//! - All requests go through a [`CrawlSession`], which waits the configured
//!   delay between requests and remembers which URLs it has visited.
//! - Items are processed one at a time and written as soon as they are
//!   extracted, so an interrupted run keeps everything saved so far.
//! - A 404 on an item page skips the item; any other fetch error ends the
//!   source run.

pub mod extract;
pub mod glossary;
pub mod html;
pub mod rss;

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, instrument, warn};

use crate::config::{SourceConfig, SourceKind};
use crate::error::{Result, ScrapeError};
use crate::outputs::{OutputTarget, WriteOutcome};
use crate::rename::RenameMode;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP access for one source run: client, politeness delay and visited set.
#[derive(Debug)]
pub struct CrawlSession {
    client: Client,
    delay: Duration,
    last_request: Option<Instant>,
    visited: HashSet<String>,
    queue: VecDeque<String>,
}

impl CrawlSession {
    pub fn new(timeout: Duration, delay: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            delay,
            last_request: None,
            visited: HashSet::new(),
            queue: VecDeque::new(),
        })
    }

    pub fn has_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Queue links that have been neither visited nor queued yet.
    pub fn enqueue(&mut self, links: impl IntoIterator<Item = String>) {
        for link in links {
            if !self.has_visited(&link) && !self.queue.contains(&link) {
                self.queue.push_back(link);
            }
        }
    }

    pub fn next_link(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    async fn throttle(&mut self) {
        if let Some(last) = self.last_request {
            sleep_until(last + self.delay).await;
        }
        self.last_request = Some(Instant::now());
    }

    /// GET `url` and return the body. The URL counts as visited afterwards,
    /// whether or not the request succeeded.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_text(&mut self, url: &str) -> Result<String> {
        self.throttle().await;
        let result = self.get(url).await;
        self.visited.insert(url.to_string());
        result
    }

    async fn get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        match response.status() {
            s if s.is_success() => {
                let body = response.text().await?;
                debug!(bytes = body.len(), "Fetched");
                Ok(body)
            }
            StatusCode::NOT_FOUND => Err(ScrapeError::NotFound(url.to_string())),
            s => Err(ScrapeError::Status {
                url: url.to_string(),
                status: s.as_u16(),
            }),
        }
    }
}

/// Counters reported at the end of a source run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceStats {
    pub saved: usize,
    /// Key renames applied across all saved items.
    pub renamed_keys: usize,
    pub already_saved: usize,
    pub not_found: usize,
    pub untitled: usize,
}

impl SourceStats {
    pub fn record(&mut self, outcome: &WriteOutcome) {
        match outcome {
            WriteOutcome::Written(report) => {
                self.saved += 1;
                self.renamed_keys += report.renamed_count();
            }
            WriteOutcome::AlreadySaved => self.already_saved += 1,
            WriteOutcome::Untitled => self.untitled += 1,
        }
    }

    /// Absorb a 404 on an item page; any other error is passed through.
    pub fn tolerate_not_found<T>(&mut self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(v) => Ok(Some(v)),
            Err(ScrapeError::NotFound(url)) => {
                warn!(%url, "Page not found; skipping");
                self.not_found += 1;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Crawl one source and archive everything it yields.
#[instrument(level = "info", skip_all, fields(source = %source.name, kind = ?source.kind))]
pub async fn run_source(source: &SourceConfig, output_root: &Path, mode: RenameMode) -> Result<SourceStats> {
    let output = OutputTarget::new(
        output_root.join(source.output_dir_name()),
        source.layout,
        source.renames.clone(),
        mode,
    );
    tokio::fs::create_dir_all(&output.dir).await?;

    let mut session = CrawlSession::new(source.timeout(), source.delay())?;
    let stats = match source.kind {
        SourceKind::Rss => rss::run(source, &mut session, &output).await?,
        SourceKind::Html => html::run(source, &mut session, &output).await?,
        SourceKind::Glossary => glossary::run(source, &mut session, &output).await?,
    };

    info!(
        saved = stats.saved,
        renamed_keys = stats.renamed_keys,
        already_saved = stats.already_saved,
        not_found = stats.not_found,
        untitled = stats.untitled,
        requests = session.visited_count(),
        "Source complete"
    );
    Ok(stats)
}
