//! Glossary scraper.
//!
//! Two page shapes are supported:
//!
//! - **Inline**: every term sits on the index page inside an element matched
//!   by `entry`; `title` and `content` are resolved inside that element.
//! - **Linked**: the index links to one page per term via `link`; each page
//!   is fetched and `title`/`content` are resolved against the whole page.
//!
//! `difficulty` and `excerpt` are optional in both shapes.

use scraper::{ElementRef, Html};
use tracing::{debug, info, instrument};
use url::Url;

use super::extract::{Compiled, first_text, joined_text, meta_content, resolve_links};
use super::{CrawlSession, SourceStats};
use crate::config::SourceConfig;
use crate::error::{Result, ScrapeError};
use crate::models::GlossaryEntry;
use crate::outputs::OutputTarget;
use crate::text::normalize;

fn entry_from(scope: ElementRef<'_>, link: String, selectors: &Compiled) -> Option<GlossaryEntry> {
    let title = first_text(scope, selectors.title.as_ref())?;
    Some(GlossaryEntry {
        title,
        link,
        difficulty: first_text(scope, selectors.difficulty.as_ref()),
        excerpt: first_text(scope, selectors.excerpt.as_ref()),
        content: joined_text(scope, selectors.content.as_ref(), " ").unwrap_or_default(),
    })
}

/// Entries laid out inline on one page. Elements without a title are dropped.
///
/// An entry's link is the first `a[href]` inside it, or the page URL.
pub fn inline_entries(page: &str, url: &Url, entry: &scraper::Selector, selectors: &Compiled) -> Vec<GlossaryEntry> {
    let doc = Html::parse_document(page);
    let anchor = super::extract::parse_selector("a[href]").ok();

    doc.select(entry)
        .filter_map(|el| {
            let link = anchor
                .as_ref()
                .and_then(|a| resolve_links(el, a, url).into_iter().next())
                .unwrap_or_else(|| url.to_string());
            entry_from(el, link, selectors)
        })
        .collect()
}

/// A term that has a page of its own. Falls back to `og:title` when the
/// `title` selector is missing or matches nothing.
pub fn page_entry(page: &str, url: &Url, selectors: &Compiled) -> Option<GlossaryEntry> {
    let doc = Html::parse_document(page);
    let root = doc.root_element();
    match entry_from(root, url.to_string(), selectors) {
        Some(entry) => Some(entry),
        None => {
            let title = normalize(&meta_content(&doc, "og:title")?);
            Some(GlossaryEntry {
                title,
                link: url.to_string(),
                difficulty: first_text(root, selectors.difficulty.as_ref()),
                excerpt: first_text(root, selectors.excerpt.as_ref()),
                content: joined_text(root, selectors.content.as_ref(), " ").unwrap_or_default(),
            })
        }
    }
}

#[instrument(level = "info", skip_all, fields(url = %source.url))]
pub async fn run(source: &SourceConfig, session: &mut CrawlSession, output: &OutputTarget) -> Result<SourceStats> {
    let selectors = Compiled::new(&source.selectors)?;
    let index_url = Url::parse(&source.url)?;
    let index = session.fetch_text(index_url.as_str()).await?;
    let mut stats = SourceStats::default();

    if let Some(entry) = &selectors.entry {
        let entries = inline_entries(&index, &index_url, entry, &selectors);
        info!(count = entries.len(), "Found inline glossary entries");
        for entry in entries {
            let outcome = output.write_record(&entry).await?;
            stats.record(&outcome);
        }
        return Ok(stats);
    }

    let Some(link) = &selectors.link else {
        return Err(ScrapeError::MissingSelector {
            source_name: source.name.clone(),
            selector: "entry or link",
        });
    };

    let links = resolve_links(Html::parse_document(&index).root_element(), link, &index_url);
    info!(count = links.len(), "Indexed glossary pages");
    session.enqueue(links);

    while let Some(next) = session.next_link() {
        let page = session.fetch_text(&next).await;
        let Some(page) = stats.tolerate_not_found(page)? else {
            continue;
        };
        let url = Url::parse(&next)?;

        if source.follow {
            let more = resolve_links(Html::parse_document(&page).root_element(), link, &url);
            session.enqueue(more);
        }

        let Some(entry) = page_entry(&page, &url, &selectors) else {
            debug!(link = %next, "No term title on page; skipping");
            stats.untitled += 1;
            continue;
        };
        let outcome = output.write_record(&entry).await?;
        stats.record(&outcome);
    }
    Ok(stats)
}
