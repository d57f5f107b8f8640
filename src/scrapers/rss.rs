//! RSS 2.0 feed scraper.
//!
//! Reads `rss/channel/item` elements and turns each into an [`Article`]. When
//! the source configures a `content` selector, the item's link is fetched
//! and the full text is taken from that element; otherwise the feed
//! description (stripped of markup) is used as the content.
//!
//! # Fields
//!
//! | Article | Feed element |
//! |---------|--------------|
//! | `id` | `guid` (falls back to `link`) |
//! | `title` | `title` |
//! | `link` | `link` |
//! | `published` | `pubDate`, as RFC 3339 when parseable |
//! | `author` | `dc:creator`, else `author` |
//! | `category` | every `category`, joined with `", "` |
//! | `image` | `media:content@url`, else `enclosure@url` |

use scraper::Html;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::extract::{Compiled, joined_text};
use super::{CrawlSession, SourceStats};
use crate::config::SourceConfig;
use crate::error::{Result, ScrapeError};
use crate::models::{Article, Record};
use crate::outputs::OutputTarget;
use crate::text::{html_to_text, normalize, normalize_date};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RawItem>,
}

/// Element text, ignoring any attributes (`guid isPermaLink`, `category domain`).
#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct UrlAttr {
    #[serde(rename = "@url")]
    url: Option<String>,
}

/// One `<item>`. Element names are matched without their namespace prefix,
/// so `dc:creator` is `creator` and `media:content` is `content`
/// (`content:encoded` is `encoded` and does not collide).
#[derive(Debug, Deserialize)]
struct RawItem {
    guid: Option<TextNode>,
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "creator")]
    creator: Option<String>,
    author: Option<String>,
    description: Option<String>,
    #[serde(rename = "category", default)]
    categories: Vec<TextNode>,
    #[serde(rename = "content", default)]
    media: Vec<UrlAttr>,
    enclosure: Option<UrlAttr>,
}

impl From<RawItem> for Article {
    fn from(raw: RawItem) -> Self {
        let link = raw.link.unwrap_or_default().trim().to_string();
        let id = raw
            .guid
            .map(|g| g.text.trim().to_string())
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| link.clone());
        let description = html_to_text(raw.description.as_deref().unwrap_or_default());
        let image = raw
            .media
            .into_iter()
            .chain(raw.enclosure)
            .find_map(|m| m.url)
            .unwrap_or_default();

        Article {
            id,
            title: normalize(raw.title.as_deref().unwrap_or_default()),
            link,
            published: normalize_date(raw.pub_date.as_deref().unwrap_or_default()),
            category: raw
                .categories
                .iter()
                .map(|c| normalize(&c.text))
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            content: description.clone(),
            description,
            author: normalize(raw.creator.or(raw.author).as_deref().unwrap_or_default()),
            image,
        }
    }
}

/// Parse an RSS document into articles, content defaulting to the description.
pub fn parse_feed(xml: &str) -> Result<Vec<Article>> {
    let rss: Rss = quick_xml::de::from_str(xml).map_err(|e| ScrapeError::Feed(e.to_string()))?;
    Ok(rss.channel.items.into_iter().map(Article::from).collect())
}

#[instrument(level = "info", skip_all, fields(url = %source.url))]
pub async fn run(source: &SourceConfig, session: &mut CrawlSession, output: &OutputTarget) -> Result<SourceStats> {
    let selectors = Compiled::new(&source.selectors)?;
    let feed = session.fetch_text(&source.url).await?;
    let articles = parse_feed(&feed)?;
    info!(count = articles.len(), "Indexed feed items");

    let mut stats = SourceStats::default();
    for mut article in articles {
        if output.is_saved(&article.slug()).await? {
            stats.already_saved += 1;
            continue;
        }

        if selectors.content.is_some() && !article.link.is_empty() && !session.has_visited(&article.link) {
            let page = session.fetch_text(&article.link).await;
            let Some(page) = stats.tolerate_not_found(page)? else {
                continue;
            };
            let doc = Html::parse_document(&page);
            match joined_text(doc.root_element(), selectors.content.as_ref(), " ") {
                Some(content) => article.content = content,
                None => debug!(link = %article.link, "Content selector matched nothing; keeping description"),
            }
        }

        let outcome = output.write_record(&article).await?;
        stats.record(&outcome);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Crypto Daily</title>
    <link>https://news.example</link>
    <item>
      <title>Bitcoin &amp; Ether rally</title>
      <link>https://news.example/btc-eth-rally</link>
      <guid isPermaLink="false">post-101</guid>
      <pubDate>Tue, 02 Jan 2024 10:30:00 +0000</pubDate>
      <dc:creator><![CDATA[Jane Doe]]></dc:creator>
      <category domain="x">Markets</category>
      <category>Bitcoin</category>
      <description><![CDATA[<p>Prices <b>jumped</b> on "ETF" news.</p>]]></description>
      <media:content url="https://news.example/img.png" medium="image"/>
    </item>
    <item>
      <title>Glossary update</title>
      <link>https://news.example/glossary</link>
      <pubDate>sometime</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed() {
        let articles = parse_feed(FEED).unwrap();
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.id, "post-101");
        assert_eq!(first.title, "Bitcoin & Ether rally");
        assert_eq!(first.link, "https://news.example/btc-eth-rally");
        assert_eq!(first.published, "2024-01-02T10:30:00+00:00");
        assert_eq!(first.author, "Jane Doe");
        assert_eq!(first.category, "Markets, Bitcoin");
        assert_eq!(first.description, "Prices jumped on 'ETF' news.");
        assert_eq!(first.content, first.description);
        assert_eq!(first.image, "https://news.example/img.png");

        let second = &articles[1];
        assert_eq!(second.id, "https://news.example/glossary");
        assert_eq!(second.published, "sometime");
        assert!(second.category.is_empty() && second.image.is_empty());
    }

    #[test]
    fn test_empty_channel() {
        let xml = "<rss><channel><title>t</title></channel></rss>";
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_not_a_feed() {
        assert!(matches!(parse_feed("<html></html>"), Err(ScrapeError::Feed(_))));
    }

    fn single_item(item: &str) -> Article {
        let xml = format!(
            r#"<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:media="http://search.yahoo.com/mrss/" xmlns:content="http://purl.org/rss/1.0/modules/content/"><channel><title>t</title><item>{item}</item></channel></rss>"#
        );
        let mut articles = parse_feed(&xml).unwrap();
        assert_eq!(articles.len(), 1);
        articles.remove(0)
    }

    #[test]
    fn test_interleaved_repeated_elements() {
        let article = single_item(
            r#"<title>ETF flows</title>
            <link>https://news.example/etf</link>
            <category>Markets</category>
            <dc:creator>Jane</dc:creator>
            <media:content url="https://news.example/a.png" medium="image"/>
            <content:encoded><![CDATA[<p>Full text</p>]]></content:encoded>
            <category>Bitcoin</category>
            <media:content url="https://news.example/b.png"/>"#,
        );
        assert_eq!(article.category, "Markets, Bitcoin");
        assert_eq!(article.author, "Jane");
        assert_eq!(article.image, "https://news.example/a.png");
    }

    #[test]
    fn test_enclosure_and_author_fallbacks() {
        let article = single_item(
            r#"<title>Halving recap</title>
            <link> https://news.example/halving </link>
            <guid isPermaLink="true">  </guid>
            <author>desk@news.example (News Desk)</author>
            <enclosure url="https://news.example/halving.jpg" type="image/jpeg" length="0"/>
            <description>Plain summary</description>"#,
        );
        assert_eq!(article.link, "https://news.example/halving");
        assert_eq!(article.id, "https://news.example/halving");
        assert_eq!(article.author, "desk@news.example (News Desk)");
        assert_eq!(article.image, "https://news.example/halving.jpg");
        assert_eq!(article.content, "Plain summary");
    }

    #[test]
    fn test_media_content_preferred_over_enclosure() {
        let article = single_item(
            r#"<title>Layer 2 fees</title>
            <enclosure url="https://news.example/enc.jpg" type="image/jpeg" length="0"/>
            <media:content url="https://news.example/media.jpg"/>
            <dc:creator>Sam</dc:creator>
            <author>other@news.example</author>"#,
        );
        assert_eq!(article.image, "https://news.example/media.jpg");
        assert_eq!(article.author, "Sam");
    }
}
