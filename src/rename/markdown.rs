//! Locate a front-matter key in a Markdown document.
//!
//! Front matter is the block between a leading `---` line and the next `---`
//! line. Only the text before the first `:` of an unindented front-matter
//! line is a key; the body below the closing delimiter is never inspected.

use super::{KeyMatch, TargetFormat};
use crate::error::RenameError;

const DELIMITER: &str = "---";

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

pub(crate) fn locate_key(buf: &str, old: &str, new: &str) -> Result<Option<KeyMatch>, RenameError> {
    let mut lines = buf.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if !is_delimiter(first) {
        return Ok(None);
    }

    let mut offset = first.len();
    let mut found = None;
    for line in lines {
        if is_delimiter(line) {
            return Ok(found);
        }

        // Indented lines belong to block scalars or nested mappings.
        let top_level = !line.starts_with([' ', '\t', '#']);
        if found.is_none() && top_level {
            if let Some(colon) = line.find(':') {
                let key = line[..colon].trim_end();
                if key == old {
                    found = Some((offset..offset + key.len(), new.to_string()));
                }
            }
        }
        offset += line.len();
    }

    Err(RenameError::Malformed {
        format: TargetFormat::Markdown,
        reason: "front matter is not closed".to_string(),
    })
}
