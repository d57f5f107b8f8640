//! Locate a top-level member name in a JSON object without re-serializing it.

use serde_json::Value;

use super::{KeyMatch, TargetFormat};
use crate::error::RenameError;

fn malformed(reason: impl Into<String>) -> RenameError {
    RenameError::Malformed {
        format: TargetFormat::Json,
        reason: reason.into(),
    }
}

/// Find the name token of the first top-level member called `old`.
///
/// The document is validated with `serde_json` first, then scanned byte by
/// byte: structural characters are ASCII, so string contents (including
/// escaped quotes) can be skipped without decoding them. Nested objects and
/// values are never matched.
pub(crate) fn locate_key(buf: &str, old: &str, new: &str) -> Result<Option<KeyMatch>, RenameError> {
    let doc: Value = serde_json::from_str(buf).map_err(|e| malformed(e.to_string()))?;
    let Value::Object(members) = doc else {
        return Err(malformed("top-level value is not an object"));
    };
    if !members.contains_key(old) {
        return Ok(None);
    }

    let bytes = buf.as_bytes();
    let mut depth = 0usize;
    let mut expect_key = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let start = i;
                i = skip_string(bytes, i + 1)?;
                if depth == 1 && expect_key {
                    expect_key = false;
                    let token = &buf[start..i];
                    let name: String =
                        serde_json::from_str(token).map_err(|e| malformed(e.to_string()))?;
                    if name == old {
                        let replacement =
                            serde_json::to_string(new).map_err(|e| malformed(e.to_string()))?;
                        return Ok(Some((start..i, replacement)));
                    }
                }
                continue;
            }
            b'{' | b'[' => {
                depth += 1;
                expect_key = depth == 1 && bytes[i] == b'{';
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            b',' if depth == 1 => expect_key = true,
            _ => {}
        }
        i += 1;
    }

    Ok(None)
}

/// Return the index just past the closing quote of a string whose body starts at `i`.
fn skip_string(bytes: &[u8], mut i: usize) -> Result<usize, RenameError> {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(malformed("unterminated string"))
}
