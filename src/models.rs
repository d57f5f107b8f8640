//! Data models for archived items.
//!
//! - [`Article`]: a news article from a feed or an HTML index
//! - [`GlossaryEntry`]: a term from a glossary or academy page
//!
//! Both implement [`Record`], which tells the serializers in
//! [`crate::outputs`] how an item is laid out in each format. JSON uses the
//! struct's field order, CSV and the Markdown front matter use their own
//! orderings.

use serde::{Deserialize, Serialize};

use crate::utils::slugify_title;

/// A scraped item that can be written as a JSON/CSV/Markdown triple.
pub trait Record: Serialize {
    /// Title used for logging and to derive the on-disk file name.
    fn title(&self) -> &str;

    /// CSV header and value cells, in column order.
    fn csv_fields(&self) -> Vec<(&'static str, &str)>;

    /// Front-matter keys and values, in output order.
    fn front_matter(&self) -> Vec<(&'static str, &str)>;

    /// Markdown body below the front matter.
    fn body(&self) -> &str;

    /// File-system safe name for this item.
    fn slug(&self) -> String {
        slugify_title(self.title())
    }
}

/// A news article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Feed GUID, or the link when the source has none.
    pub id: String,
    pub title: String,
    pub link: String,
    /// Publication time; RFC 3339 when the source date could be parsed.
    pub published: String,
    /// Comma separated list of categories.
    pub category: String,
    pub description: String,
    pub content: String,
    pub author: String,
    /// Lead image URL.
    pub image: String,
}

impl Record for Article {
    fn title(&self) -> &str {
        &self.title
    }

    fn csv_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("id", self.id.as_str()),
            ("title", self.title.as_str()),
            ("link", self.link.as_str()),
            ("published", self.published.as_str()),
            ("description", self.description.as_str()),
            ("content", self.content.as_str()),
            ("author", self.author.as_str()),
            ("category", self.category.as_str()),
            ("image", self.image.as_str()),
        ]
    }

    fn front_matter(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("id", self.id.as_str()),
            ("title", self.title.as_str()),
            ("link", self.link.as_str()),
            ("published", self.published.as_str()),
            ("description", self.description.as_str()),
            ("author", self.author.as_str()),
            ("category", self.category.as_str()),
            ("image", self.image.as_str()),
        ]
    }

    fn body(&self) -> &str {
        &self.content
    }
}

/// A glossary term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GlossaryEntry {
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub content: String,
}

impl GlossaryEntry {
    fn optional_fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("difficulty", self.difficulty.as_deref()),
            ("excerpt", self.excerpt.as_deref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
    }
}

impl Record for GlossaryEntry {
    fn title(&self) -> &str {
        &self.title
    }

    fn csv_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![("title", self.title.as_str()), ("link", self.link.as_str())];
        fields.extend(self.optional_fields());
        fields.push(("content", self.content.as_str()));
        fields
    }

    fn front_matter(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![("title", self.title.as_str()), ("link", self.link.as_str())];
        fields.extend(self.optional_fields());
        fields
    }

    fn body(&self) -> &str {
        &self.content
    }
}
