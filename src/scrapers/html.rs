//! HTML index scraper.
//!
//! Fetches the source's index page, follows every link matched by the `link`
//! selector and extracts an [`Article`] from each page. With `follow: true`
//! the same selector is applied to every article page as well, so a site can
//! be walked page by page; the session's visited set keeps each URL to one
//! fetch per run.

use scraper::Html;
use tracing::{debug, info, instrument};
use url::Url;

use super::extract::{Compiled, first_text, first_url, joined_text, meta_content, resolve_links};
use super::{CrawlSession, SourceStats};
use crate::config::SourceConfig;
use crate::error::{Result, ScrapeError};
use crate::models::Article;
use crate::outputs::OutputTarget;
use crate::text::{normalize, normalize_date};

/// Extract an article from a fetched page. Returns `None` when no title is found.
pub fn extract_article(page: &str, url: &Url, selectors: &Compiled) -> Option<Article> {
    let doc = Html::parse_document(page);
    let root = doc.root_element();

    let title = first_text(root, selectors.title.as_ref())
        .or_else(|| meta_content(&doc, "og:title").map(|t| normalize(&t)))?;

    let description = meta_content(&doc, "og:description")
        .or_else(|| meta_content(&doc, "description"))
        .map(|d| normalize(&d))
        .unwrap_or_default();

    let published = first_text(root, selectors.published.as_ref())
        .or_else(|| meta_content(&doc, "article:published_time"))
        .map(|p| normalize_date(&p))
        .unwrap_or_default();

    Some(Article {
        id: url.to_string(),
        title,
        link: url.to_string(),
        published,
        category: joined_text(root, selectors.category.as_ref(), ", ").unwrap_or_default(),
        content: joined_text(root, selectors.content.as_ref(), " ").unwrap_or_else(|| description.clone()),
        description,
        author: first_text(root, selectors.author.as_ref())
            .or_else(|| meta_content(&doc, "author"))
            .unwrap_or_default(),
        image: first_url(root, selectors.image.as_ref(), url)
            .or_else(|| meta_content(&doc, "og:image"))
            .unwrap_or_default(),
    })
}

/// Links on a page matched by the `link` selector.
pub fn page_links(page: &str, url: &Url, selectors: &Compiled) -> Vec<String> {
    match &selectors.link {
        Some(link) => resolve_links(Html::parse_document(page).root_element(), link, url),
        None => Vec::new(),
    }
}

#[instrument(level = "info", skip_all, fields(url = %source.url))]
pub async fn run(source: &SourceConfig, session: &mut CrawlSession, output: &OutputTarget) -> Result<SourceStats> {
    let selectors = Compiled::new(&source.selectors)?;
    if selectors.link.is_none() {
        return Err(ScrapeError::MissingSelector {
            source_name: source.name.clone(),
            selector: "link",
        });
    }

    let index_url = Url::parse(&source.url)?;
    let index = session.fetch_text(index_url.as_str()).await?;
    let links = page_links(&index, &index_url, &selectors);
    info!(count = links.len(), "Indexed article links");
    session.enqueue(links);

    let mut stats = SourceStats::default();
    while let Some(link) = session.next_link() {
        let page = session.fetch_text(&link).await;
        let Some(page) = stats.tolerate_not_found(page)? else {
            continue;
        };
        let url = Url::parse(&link)?;

        if source.follow {
            session.enqueue(page_links(&page, &url, &selectors));
        }

        let Some(article) = extract_article(&page, &url, &selectors) else {
            debug!(%link, "No title on page; skipping");
            stats.untitled += 1;
            continue;
        };
        let outcome = output.write_record(&article).await?;
        stats.record(&outcome);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Selectors;

    const PAGE: &str = r#"<html><head>
        <meta property="og:title" content="Fallback title">
        <meta property="og:description" content="A short summary">
        <meta property="og:image" content="https://site.example/og.png">
        <meta property="article:published_time" content="2024-02-01T08:00:00Z">
    </head><body>
        <h1 class="headline">  Solana   outage explained </h1>
        <span class="byline">Alex</span>
        <a class="tag">Solana</a><a class="tag">Outages</a>
        <article><p>Validators stalled.</p><p>Then restarted.</p></article>
        <nav><a class="next" href="/page-2">next</a></nav>
    </body></html>"#;

    fn compiled(selectors: Selectors) -> Compiled {
        Compiled::new(&selectors).unwrap()
    }

    #[test]
    fn test_extract_with_selectors() {
        let url = Url::parse("https://site.example/solana").unwrap();
        let selectors = compiled(Selectors {
            title: Some("h1.headline".into()),
            content: Some("article p".into()),
            author: Some(".byline".into()),
            category: Some("a.tag".into()),
            ..Default::default()
        });

        let article = extract_article(PAGE, &url, &selectors).unwrap();
        assert_eq!(article.title, "Solana outage explained");
        assert_eq!(article.content, "Validators stalled. Then restarted.");
        assert_eq!(article.author, "Alex");
        assert_eq!(article.category, "Solana, Outages");
        assert_eq!(article.description, "A short summary");
        assert_eq!(article.image, "https://site.example/og.png");
        assert_eq!(article.published, "2024-02-01T08:00:00Z");
        assert_eq!(article.id, "https://site.example/solana");
    }

    #[test]
    fn test_extract_falls_back_to_meta() {
        let url = Url::parse("https://site.example/solana").unwrap();
        let article = extract_article(PAGE, &url, &Compiled::default()).unwrap();
        assert_eq!(article.title, "Fallback title");
        assert_eq!(article.content, "A short summary");
    }

    #[test]
    fn test_page_without_title() {
        let url = Url::parse("https://site.example/empty").unwrap();
        assert!(extract_article("<html><body><p>x</p></body></html>", &url, &Compiled::default()).is_none());
    }

    #[test]
    fn test_page_links() {
        let url = Url::parse("https://site.example/solana").unwrap();
        let selectors = compiled(Selectors {
            link: Some("a.next".into()),
            ..Default::default()
        });
        assert_eq!(page_links(PAGE, &url, &selectors), ["https://site.example/page-2"]);
        assert!(page_links(PAGE, &url, &Compiled::default()).is_empty());
    }
}
