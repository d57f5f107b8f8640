//! CSV header cells: locating them for renames and quoting them for output.
//!
//! Quoting follows RFC 4180 with the same trigger set the archive has always
//! used: a cell is quoted when it contains a comma, a double quote, a CR or
//! LF, or starts with whitespace. Embedded quotes are doubled.

use std::borrow::Cow;

use super::{KeyMatch, TargetFormat};
use crate::error::RenameError;

pub fn needs_quotes(cell: &str) -> bool {
    cell.contains([',', '"', '\r', '\n']) || cell.starts_with(char::is_whitespace)
}

/// Quote `cell` if it needs it.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(quote_cell("plain"), "plain");
/// assert_eq!(quote_cell("a \"b\", c"), "\"a \"\"b\"\", c\"");
/// ```
pub fn quote_cell(cell: &str) -> Cow<'_, str> {
    if needs_quotes(cell) {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}

fn malformed(reason: &str) -> RenameError {
    RenameError::Malformed {
        format: TargetFormat::Csv,
        reason: reason.to_string(),
    }
}

/// Find the first header cell whose (unquoted) value equals `old`.
///
/// Only the first record is parsed; a quoted header cell may span lines.
pub(crate) fn locate_key(buf: &str, old: &str, new: &str) -> Result<Option<KeyMatch>, RenameError> {
    let bytes = buf.as_bytes();
    let mut i = 0;

    loop {
        let start = i;
        let value: Cow<'_, str> = if bytes.get(i) == Some(&b'"') {
            i += 1;
            let mut unescaped = String::new();
            let mut seg = i;
            loop {
                match bytes.get(i) {
                    None => return Err(malformed("unterminated quoted header cell")),
                    Some(b'"') if bytes.get(i + 1) == Some(&b'"') => {
                        unescaped.push_str(&buf[seg..=i]);
                        i += 2;
                        seg = i;
                    }
                    Some(b'"') => {
                        unescaped.push_str(&buf[seg..i]);
                        i += 1;
                        break;
                    }
                    Some(_) => i += 1,
                }
            }
            Cow::Owned(unescaped)
        } else {
            while !matches!(bytes.get(i), None | Some(b',' | b'\r' | b'\n')) {
                i += 1;
            }
            Cow::Borrowed(&buf[start..i])
        };

        if value == old {
            return Ok(Some((start..i, quote_cell(new).into_owned())));
        }

        match bytes.get(i) {
            Some(b',') => i += 1,
            None | Some(b'\r' | b'\n') => return Ok(None),
            Some(_) => return Err(malformed("unexpected character after quoted header cell")),
        }
    }
}
