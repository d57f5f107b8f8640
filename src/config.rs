//! Source definitions loaded from a YAML file.
//!
//! Each source names a site, the crawl strategy to use and the CSS selectors
//! that strategy needs. Selectors live in configuration because site markup
//! changes far more often than the crawler does.
//!
//! ```yaml
//! sources:
//!   - name: cointelegraph
//!     kind: rss
//!     url: https://cointelegraph.com/rss
//!     output: cointelegraph.com
//!     selectors:
//!       content: .post-content
//!     renames:
//!       category: categories
//!       published: created_at
//! ```

use std::error::Error;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, instrument};

use crate::outputs::Layout;
use crate::rename::RenameMap;

const DEFAULT_DELAY_MS: u64 = 2_000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Crawl strategy for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// An RSS 2.0 feed, optionally following each item link for the full text.
    Rss,
    /// An HTML index page linking to article pages.
    Html,
    /// A glossary: entries inline on one page, or one page per term.
    Glossary,
}

/// CSS selectors a strategy may use. Which ones are required depends on the kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Selectors {
    /// Links on the index page to follow.
    pub link: Option<String>,
    /// Element wrapping one inline glossary entry.
    pub entry: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub published: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub difficulty: Option<String>,
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub kind: SourceKind,
    pub url: String,
    /// Directory under the output root. Defaults to `name`.
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Also follow `link` matches found on item pages, not just the index.
    #[serde(default)]
    pub follow: bool,
    #[serde(default)]
    pub selectors: Selectors,
    #[serde(default)]
    pub renames: RenameMap,
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl SourceConfig {
    pub fn output_dir_name(&self) -> &str {
        self.output.as_deref().unwrap_or(&self.name)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub sources: Vec<SourceConfig>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Sources whose name is in `names`, or all sources when `names` is empty.
    pub fn select<'a>(&'a self, names: &'a [String]) -> impl Iterator<Item = &'a SourceConfig> + 'a {
        self.sources
            .iter()
            .filter(move |s| names.is_empty() || names.iter().any(|n| n == &s.name))
    }
}

/// Read and parse the sources file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_config(path: &Path) -> Result<Config, Box<dyn Error>> {
    let yaml = tokio::fs::read_to_string(path).await?;
    let config = Config::from_yaml(&yaml)?;

    if let Some(dup) = duplicate_name(&config) {
        return Err(format!("duplicate source name `{dup}`").into());
    }

    info!(sources = config.sources.len(), "Loaded source configuration");
    Ok(config)
}

fn duplicate_name(config: &Config) -> Option<&str> {
    use itertools::Itertools;
    config
        .sources
        .iter()
        .map(|s| s.name.as_str())
        .duplicates()
        .next()
}
