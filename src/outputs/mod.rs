//! Writing records to disk as JSON, Markdown and CSV.
//!
//! # Submodules
//!
//! - [`json`]: pretty-printed JSON with a one-space indent
//! - [`markdown`]: YAML front matter plus the record body
//! - [`csv`]: a header line and one data row
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── cointelegraph.com/            # Layout::Flat
//! │   ├── bitcoin-hits-new-high.json
//! │   ├── bitcoin-hits-new-high.csv
//! │   └── bitcoin-hits-new-high.md
//! └── coindesk-glossary/            # Layout::Nested
//!     └── proof-of-stake/
//!         ├── article.json
//!         ├── article.csv
//!         └── article.md
//! ```
//!
//! # Idempotence
//!
//! The JSON file is the marker that an item has been archived: if it exists,
//! the item is skipped without touching any of its files. It is written first
//! and the renames run last.

pub mod csv;
pub mod json;
pub mod markdown;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::models::Record;
use crate::rename::{RenameMap, RenameMode, RenameReport, rename_fields};

/// How item files are arranged inside a source's output directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `<slug>.json`, `<slug>.csv`, `<slug>.md`
    #[default]
    Flat,
    /// `<slug>/article.json`, `<slug>/article.csv`, `<slug>/article.md`
    Nested,
}

/// The three files one item is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
    pub csv: PathBuf,
}

impl Layout {
    pub fn paths(self, dir: &Path, slug: &str) -> ItemPaths {
        let (base, stem) = match self {
            Layout::Flat => (dir.to_path_buf(), slug),
            Layout::Nested => (dir.join(slug), "article"),
        };
        ItemPaths {
            json: base.join(format!("{stem}.json")),
            markdown: base.join(format!("{stem}.md")),
            csv: base.join(format!("{stem}.csv")),
        }
    }
}

#[derive(Debug)]
pub enum WriteOutcome {
    Written(RenameReport),
    /// The idempotence marker already exists.
    AlreadySaved,
    /// The title produced an empty slug, so there is no file name to use.
    Untitled,
}

/// Where and how a source writes its items.
#[derive(Debug, Clone)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub layout: Layout,
    pub renames: RenameMap,
    pub mode: RenameMode,
}

impl OutputTarget {
    pub fn new(dir: impl Into<PathBuf>, layout: Layout, renames: RenameMap, mode: RenameMode) -> Self {
        Self {
            dir: dir.into(),
            layout,
            renames,
            mode,
        }
    }

    /// Whether the item with this slug has already been archived.
    pub async fn is_saved(&self, slug: &str) -> Result<bool> {
        let paths = self.layout.paths(&self.dir, slug);
        Ok(fs::try_exists(&paths.json).await?)
    }

    /// Write `record` as a JSON/Markdown/CSV triple and apply the source's renames.
    ///
    /// Skips the record when its JSON file already exists. Write and rename
    /// failures are returned; a missing rename key is not a failure.
    #[instrument(level = "info", skip_all, fields(title = %record.title()))]
    pub async fn write_record<R: Record + ?Sized>(&self, record: &R) -> Result<WriteOutcome> {
        let slug = record.slug();
        if slug.is_empty() {
            warn!("Title has no usable characters; skipping");
            return Ok(WriteOutcome::Untitled);
        }

        let paths = self.layout.paths(&self.dir, &slug);
        if fs::try_exists(&paths.json).await? {
            debug!(path = %paths.json.display(), "Already saved");
            return Ok(WriteOutcome::AlreadySaved);
        }

        if let Some(parent) = paths.json.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&paths.json, json::to_json(record)?).await?;
        fs::write(&paths.markdown, markdown::to_markdown(record)?).await?;
        fs::write(&paths.csv, csv::to_csv(record)).await?;

        let report = rename_fields(
            &self.renames,
            &paths.json,
            &paths.markdown,
            &paths.csv,
            self.mode,
        )
        .await?;

        info!(path = %paths.json.display(), "Saved item");
        Ok(WriteOutcome::Written(report))
    }
}
