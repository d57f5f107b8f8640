//! Selector helpers shared by the crawl strategies.

use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::Selectors;
use crate::error::{Result, ScrapeError};
use crate::text::element_text;

pub fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| ScrapeError::Selector(css.to_string()))
}

fn compile(css: Option<&String>) -> Result<Option<Selector>> {
    css.map(|c| parse_selector(c)).transpose()
}

/// [`Selectors`] with every configured selector parsed.
#[derive(Debug, Default)]
pub struct Compiled {
    pub link: Option<Selector>,
    pub entry: Option<Selector>,
    pub title: Option<Selector>,
    pub content: Option<Selector>,
    pub author: Option<Selector>,
    pub published: Option<Selector>,
    pub category: Option<Selector>,
    pub image: Option<Selector>,
    pub difficulty: Option<Selector>,
    pub excerpt: Option<Selector>,
}

impl Compiled {
    pub fn new(selectors: &Selectors) -> Result<Self> {
        Ok(Self {
            link: compile(selectors.link.as_ref())?,
            entry: compile(selectors.entry.as_ref())?,
            title: compile(selectors.title.as_ref())?,
            content: compile(selectors.content.as_ref())?,
            author: compile(selectors.author.as_ref())?,
            published: compile(selectors.published.as_ref())?,
            category: compile(selectors.category.as_ref())?,
            image: compile(selectors.image.as_ref())?,
            difficulty: compile(selectors.difficulty.as_ref())?,
            excerpt: compile(selectors.excerpt.as_ref())?,
        })
    }
}

/// Normalized text of the first non-empty match under `scope`.
pub fn first_text(scope: ElementRef<'_>, selector: Option<&Selector>) -> Option<String> {
    scope
        .select(selector?)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Normalized text of every match under `scope`, joined with `sep`.
pub fn joined_text(scope: ElementRef<'_>, selector: Option<&Selector>, sep: &str) -> Option<String> {
    let joined = scope
        .select(selector?)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .join(sep);
    (!joined.is_empty()).then_some(joined)
}

/// `content` of `<meta property=..>` or `<meta name=..>`.
pub fn meta_content(doc: &Html, property: &str) -> Option<String> {
    let selector = parse_selector("meta[content]").ok()?;
    doc.select(&selector)
        .find(|m| {
            let el = m.value();
            el.attr("property") == Some(property) || el.attr("name") == Some(property)
        })
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// First `src`/`href`/`content` attribute under `scope`, resolved against `base`.
pub fn first_url(scope: ElementRef<'_>, selector: Option<&Selector>, base: &Url) -> Option<String> {
    scope.select(selector?).find_map(|el| {
        let v = el.value();
        let raw = v.attr("src").or(v.attr("href")).or(v.attr("content"))?;
        base.join(raw.trim()).ok().map(String::from)
    })
}

/// Unique absolute http(s) links matched by `selector`, in document order.
///
/// Fragments are stripped so `page#a` and `page#b` count as one link.
pub fn resolve_links(scope: ElementRef<'_>, selector: &Selector, base: &Url) -> Vec<String> {
    scope
        .select(selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|mut url| {
            url.set_fragment(None);
            String::from(url)
        })
        .unique()
        .collect()
}
