//! Post-write key renaming across the JSON, Markdown and CSV copies of a record.
//!
//! Every source writes an item as three files and then renames a handful of
//! keys so the output matches the schema the archive expects (`title` becomes
//! `term` for glossaries, `published` becomes `created_at`, and so on). The
//! renamer only ever touches key tokens; values are left byte-for-byte intact.
//!
//! # Matching
//!
//! | Format | [`RenameMode::FirstOccurrence`] | [`RenameMode::Structural`] |
//! |--------|-------------------------------|----------------------------|
//! | JSON | first `"old"` substring | first top-level member named `old` |
//! | Markdown | first `old:` substring | first front-matter line keyed `old` |
//! | CSV | first `old` substring | first header cell equal to `old` |
//!
//! `FirstOccurrence` reproduces the historical string-replace behaviour, which
//! can corrupt a value that happens to contain the key text ahead of the key.
//! `Structural` is the default and changes the same bytes whenever the
//! historical rule would have hit the real key.
//!
//! # Processing order
//!
//! Keys are applied one at a time. For each key all three files are
//! read, patched and rewritten before the next key is considered.

pub mod csv;
pub mod json;
pub mod markdown;

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::error::RenameError;

/// Mapping from old field name to new field name.
///
/// Backed by a `BTreeMap` so iteration order is deterministic; the renamer
/// does not rely on it since keys are expected not to overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenameMap(BTreeMap<String, String>);

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RenameMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for RenameMap {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// How a key occurrence is located inside a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RenameMode {
    /// Parse just enough of each format to find the key position.
    #[default]
    Structural,
    /// Replace the first textual match of the key pattern, wherever it is.
    FirstOccurrence,
}

/// The three serializations a record is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    Json,
    Markdown,
    Csv,
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetFormat::Json => "JSON",
            TargetFormat::Markdown => "Markdown",
            TargetFormat::Csv => "CSV",
        };
        f.write_str(name)
    }
}

/// A located key token and the text that should replace it.
pub(crate) type KeyMatch = (Range<usize>, String);

impl TargetFormat {
    /// The literal pattern the historical string-replace rule searches for.
    fn legacy_pattern(self, key: &str) -> String {
        match self {
            TargetFormat::Json => format!("\"{key}\""),
            TargetFormat::Markdown => format!("{key}:"),
            TargetFormat::Csv => key.to_string(),
        }
    }

    fn locate(
        self,
        buf: &str,
        old: &str,
        new: &str,
        mode: RenameMode,
    ) -> Result<Option<KeyMatch>, RenameError> {
        match mode {
            RenameMode::FirstOccurrence => {
                let pattern = self.legacy_pattern(old);
                Ok(buf
                    .find(&pattern)
                    .map(|start| (start..start + pattern.len(), self.legacy_pattern(new))))
            }
            RenameMode::Structural => match self {
                TargetFormat::Json => json::locate_key(buf, old, new),
                TargetFormat::Markdown => markdown::locate_key(buf, old, new),
                TargetFormat::Csv => csv::locate_key(buf, old, new),
            },
        }
    }

    /// Rename the first occurrence of `old` in `buf`, returning the new buffer.
    ///
    /// Returns [`RenameError::NotFound`] when the key does not occur, which
    /// includes an empty `old` key.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let out = TargetFormat::Csv.rename_key("title,link\nx,y\n", "title", "name", RenameMode::Structural)?;
    /// assert_eq!(out, "name,link\nx,y\n");
    /// ```
    pub fn rename_key(
        self,
        buf: &str,
        old: &str,
        new: &str,
        mode: RenameMode,
    ) -> Result<String, RenameError> {
        let not_found = || RenameError::NotFound {
            key: old.to_string(),
            format: self,
        };
        if old.is_empty() {
            return Err(not_found());
        }

        let (span, replacement) = self.locate(buf, old, new, mode)?.ok_or_else(not_found)?;

        let mut out = String::with_capacity(buf.len() + replacement.len());
        out.push_str(&buf[..span.start]);
        out.push_str(&replacement);
        out.push_str(&buf[span.end..]);
        Ok(out)
    }
}

/// One of the three files a record was written to.
#[derive(Debug, Clone)]
pub struct TargetFile {
    pub format: TargetFormat,
    pub path: PathBuf,
}

impl TargetFile {
    pub fn new(format: TargetFormat, path: impl Into<PathBuf>) -> Self {
        Self {
            format,
            path: path.into(),
        }
    }

    /// Read the file, rename one key and write the file back in full.
    ///
    /// A missing key leaves the file untouched and yields [`KeyOutcome::NotFound`].
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display(), format = %self.format, %old, %new))]
    pub async fn rename(
        &self,
        old: &str,
        new: &str,
        mode: RenameMode,
    ) -> Result<KeyOutcome, RenameError> {
        let io_err = |source| RenameError::Io {
            path: self.path.clone(),
            source,
        };

        let buf = fs::read_to_string(&self.path).await.map_err(io_err)?;
        match self.format.rename_key(&buf, old, new, mode) {
            Ok(updated) => {
                fs::write(&self.path, updated).await.map_err(io_err)?;
                debug!("Renamed key");
                Ok(KeyOutcome::Renamed)
            }
            Err(e) if e.is_not_found() => {
                debug!("Key absent; leaving file as is");
                Ok(KeyOutcome::NotFound)
            }
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Renamed,
    NotFound,
}

/// What happened to each key in each target during [`rename_fields`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenameReport {
    pub entries: Vec<ReportEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub key: String,
    pub format: TargetFormat,
    pub outcome: KeyOutcome,
}

impl RenameReport {
    pub fn renamed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == KeyOutcome::Renamed)
            .count()
    }

    pub fn missing(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|e| e.outcome == KeyOutcome::NotFound)
    }
}

/// Apply `renames` to the JSON, Markdown and CSV copies of one record.
///
/// Keys absent from a file are skipped silently (and reported as
/// [`KeyOutcome::NotFound`]); only I/O failures and malformed targets are
/// returned as errors. A failure part-way through leaves earlier rewrites in
/// place.
#[instrument(level = "info", skip_all, fields(json = %json.display(), keys = renames.len()))]
pub async fn rename_fields(
    renames: &RenameMap,
    json: &Path,
    markdown: &Path,
    csv: &Path,
    mode: RenameMode,
) -> Result<RenameReport, RenameError> {
    let targets = [
        TargetFile::new(TargetFormat::Json, json),
        TargetFile::new(TargetFormat::Markdown, markdown),
        TargetFile::new(TargetFormat::Csv, csv),
    ];

    let mut report = RenameReport::default();
    for (old, new) in renames.iter() {
        for target in &targets {
            let outcome = target.rename(old, new, mode).await?;
            report.entries.push(ReportEntry {
                key: old.to_string(),
                format: target.format,
                outcome,
            });
        }
    }

    if !renames.is_empty() {
        let missing: Vec<_> = report
            .missing()
            .map(|e| format!("{}:{}", e.format, e.key))
            .collect();
        info!(
            renamed = report.renamed_count(),
            ?missing,
            "Applied field renames"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const JSON: &str = "{\n \"title\": \"x\",\n \"content\": \"title appears here too\"\n}";
    const MARKDOWN: &str = "---\ntitle: \"x\"\nlink: \"y\"\n---\nbody\n";
    const CSV: &str = "title,link,content\nx,y,title appears here too\n";

    async fn write_triple(dir: &TempDir, json: &str, md: &str, csv: &str) -> [PathBuf; 3] {
        let paths = [
            dir.path().join("article.json"),
            dir.path().join("article.md"),
            dir.path().join("article.csv"),
        ];
        fs::write(&paths[0], json).await.unwrap();
        fs::write(&paths[1], md).await.unwrap();
        fs::write(&paths[2], csv).await.unwrap();
        paths
    }

    async fn read(path: &Path) -> String {
        fs::read_to_string(path).await.unwrap()
    }

    fn outcome(report: &RenameReport, key: &str, format: TargetFormat) -> Option<KeyOutcome> {
        report
            .entries
            .iter()
            .find(|e| e.key == key && e.format == format)
            .map(|e| e.outcome)
    }

    #[test]
    fn test_json_only_first_key_occurrence_renamed() {
        for mode in [RenameMode::Structural, RenameMode::FirstOccurrence] {
            let out = TargetFormat::Json
                .rename_key(JSON, "title", "term", mode)
                .unwrap();
            assert_eq!(
                out,
                "{\n \"term\": \"x\",\n \"content\": \"title appears here too\"\n}"
            );
        }
    }

    #[test]
    fn test_markdown_front_matter_example() {
        let out = TargetFormat::Markdown
            .rename_key("title: \"x\"\nlink: \"y\"", "title", "name", RenameMode::FirstOccurrence)
            .unwrap();
        assert_eq!(out, "name: \"x\"\nlink: \"y\"");

        let out = TargetFormat::Markdown
            .rename_key(MARKDOWN, "title", "name", RenameMode::Structural)
            .unwrap();
        assert_eq!(out, "---\nname: \"x\"\nlink: \"y\"\n---\nbody\n");
    }

    #[test]
    fn test_csv_header_renamed_data_row_untouched() {
        for mode in [RenameMode::Structural, RenameMode::FirstOccurrence] {
            let out = TargetFormat::Csv.rename_key(CSV, "title", "name", mode).unwrap();
            assert_eq!(out, "name,link,content\nx,y,title appears here too\n");
        }
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let err = TargetFormat::Csv
            .rename_key(CSV, "difficulty", "level", RenameMode::Structural)
            .unwrap_err();
        assert!(err.is_not_found());

        let err = TargetFormat::Json
            .rename_key(JSON, "", "level", RenameMode::FirstOccurrence)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_legacy_mode_can_hit_content_structural_does_not() {
        let md = "---\nsummary: \"see title: below\"\ntitle: \"x\"\n---\n";
        let legacy = TargetFormat::Markdown
            .rename_key(md, "title", "name", RenameMode::FirstOccurrence)
            .unwrap();
        assert_eq!(legacy, "---\nsummary: \"see name: below\"\ntitle: \"x\"\n---\n");

        let structural = TargetFormat::Markdown
            .rename_key(md, "title", "name", RenameMode::Structural)
            .unwrap();
        assert_eq!(structural, "---\nsummary: \"see title: below\"\nname: \"x\"\n---\n");
    }

    #[test]
    fn test_rename_map_construction() {
        let map = RenameMap::from([("category", "categories"), ("published", "created_at")]);
        assert_eq!(map.len(), 2);
        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![("category", "categories"), ("published", "created_at")]);
        assert!(RenameMap::new().is_empty());
    }

    #[tokio::test]
    async fn test_rename_fields_updates_all_three_files() {
        let dir = TempDir::new().unwrap();
        let [json, md, csv] = write_triple(&dir, JSON, MARKDOWN, CSV).await;

        let renames = RenameMap::from([("title", "term")]);
        let report = rename_fields(&renames, &json, &md, &csv, RenameMode::Structural)
            .await
            .unwrap();

        assert_eq!(report.renamed_count(), 3);
        assert_eq!(
            read(&json).await,
            "{\n \"term\": \"x\",\n \"content\": \"title appears here too\"\n}"
        );
        assert_eq!(read(&md).await, "---\nterm: \"x\"\nlink: \"y\"\n---\nbody\n");
        assert_eq!(read(&csv).await, "term,link,content\nx,y,title appears here too\n");
    }

    #[tokio::test]
    async fn test_rename_fields_partial_application() {
        let dir = TempDir::new().unwrap();
        let json_src = "{\n \"title\": \"x\",\n \"difficulty\": \"easy\"\n}";
        let md_src = "---\ntitle: x\ndifficulty: easy\n---\nbody";
        let [json, md, csv] = write_triple(&dir, json_src, md_src, CSV).await;

        let renames = RenameMap::from([("difficulty", "level")]);
        for mode in [RenameMode::Structural, RenameMode::FirstOccurrence] {
            if mode == RenameMode::FirstOccurrence {
                fs::write(&json, json_src).await.unwrap();
                fs::write(&md, md_src).await.unwrap();
            }
            let report = rename_fields(&renames, &json, &md, &csv, mode).await.unwrap();

            assert_eq!(outcome(&report, "difficulty", TargetFormat::Json), Some(KeyOutcome::Renamed));
            assert_eq!(outcome(&report, "difficulty", TargetFormat::Markdown), Some(KeyOutcome::Renamed));
            assert_eq!(outcome(&report, "difficulty", TargetFormat::Csv), Some(KeyOutcome::NotFound));
            assert_eq!(read(&json).await, "{\n \"title\": \"x\",\n \"level\": \"easy\"\n}");
            assert_eq!(read(&md).await, "---\ntitle: x\nlevel: easy\n---\nbody");
            assert_eq!(read(&csv).await, CSV);
        }
    }

    #[tokio::test]
    async fn test_second_application_is_noop() {
        let dir = TempDir::new().unwrap();
        let [json, md, csv] = write_triple(&dir, JSON, MARKDOWN, CSV).await;
        let renames = RenameMap::from([("title", "name"), ("link", "url")]);

        rename_fields(&renames, &json, &md, &csv, RenameMode::Structural)
            .await
            .unwrap();
        let before = (read(&json).await, read(&md).await, read(&csv).await);

        let report = rename_fields(&renames, &json, &md, &csv, RenameMode::Structural)
            .await
            .unwrap();
        assert_eq!(report.renamed_count(), 0);
        assert_eq!(report.missing().count(), 6);
        assert_eq!(before, (read(&json).await, read(&md).await, read(&csv).await));
    }

    #[tokio::test]
    async fn test_empty_map_leaves_files_alone() {
        let dir = TempDir::new().unwrap();
        let [json, md, csv] = write_triple(&dir, JSON, MARKDOWN, CSV).await;

        let report = rename_fields(&RenameMap::new(), &json, &md, &csv, RenameMode::Structural)
            .await
            .unwrap();
        assert!(report.entries.is_empty());
        assert_eq!(read(&json).await, JSON);
    }

    #[tokio::test]
    async fn test_unreadable_target_is_io_error() {
        let dir = TempDir::new().unwrap();
        let [json, md, _] = write_triple(&dir, JSON, MARKDOWN, CSV).await;
        let missing = dir.path().join("nope.csv");

        let err = rename_fields(
            &RenameMap::from([("title", "name")]),
            &json,
            &md,
            &missing,
            RenameMode::Structural,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RenameError::Io { .. }));
        // Earlier targets keep their rewrite.
        assert!(read(&json).await.contains("\"name\""));
    }
}
