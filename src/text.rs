//! Text cleanup applied to every extracted field before it is saved.

use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Flatten `raw` onto a single line.
///
/// Newlines and tabs are dropped, double quotes become single quotes, and
/// runs of whitespace collapse to a single space.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize("  Say \"gm\"\n\tto   all "), "Say 'gm' to all");
/// ```
pub fn normalize(raw: &str) -> String {
    let flattened = raw.replace(['\n', '\t'], " ").replace('"', "'");
    WHITESPACE.replace_all(&flattened, " ").trim().to_string()
}

/// Text content of an element, normalized.
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize(&element.text().collect::<Vec<_>>().join(" "))
}

/// Strip markup from an HTML fragment (feed descriptions are often HTML).
pub fn html_to_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    normalize(&parsed.root_element().text().collect::<Vec<_>>().join(" "))
}

/// Normalize an RFC 2822 feed date to RFC 3339; other values are kept as is.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    match DateTime::parse_from_rfc2822(raw) {
        Ok(dt) => dt.to_rfc3339(),
        Err(_) => raw.to_string(),
    }
}
