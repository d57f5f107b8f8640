//! Utility functions for slugs, log previews and output directory checks.

use std::io;
use std::path::Path;

use tokio::fs;
use tracing::{info, instrument};

/// Longest slug, in characters, used as a file name.
const MAX_SLUG_CHARS: usize = 120;

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` bytes (rounded down to a character
/// boundary) with an ellipsis and a byte count appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log(&"x".repeat(500), 10), "xxxxxxxxxx…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Convert a title to a file-system safe slug.
///
/// Lowercases the text, drops everything that is not alphanumeric, a space
/// or a hyphen, turns spaces into hyphens and squeezes repeated hyphens.
/// The result is capped at 120 characters.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify_title("What is a DAO?"), "what-is-a-dao");
/// ```
pub fn slugify_title(title: &str) -> String {
    let cleaned = title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-");

    cleaned
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(MAX_SLUG_CHARS)
        .collect::<String>()
        .trim_end_matches('-')
        .to_string()
}

/// Name of the empty file written to prove the output root accepts writes.
const PROBE_FILE: &str = ".crypto_news_archive.probe";

/// Create the output root if needed and check that files can be written into it.
///
/// Checked once up front so a read-only mount fails fast instead of after the
/// first feed has been fetched.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let probe = path.join(PROBE_FILE);
    fs::write(&probe, b"").await?;
    fs::remove_file(&probe).await?;
    info!("Output directory is writable");
    Ok(())
}
