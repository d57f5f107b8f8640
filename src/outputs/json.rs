//! JSON serialization of a record.
//!
//! Records are pretty-printed with a one-space indent, fields in struct
//! order, which is the shape the archive has always used:
//!
//! ```text
//! {
//!  "title": "Proof of Stake",
//!  "content": "..."
//! }
//! ```

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

pub fn to_json<T: Serialize + ?Sized>(record: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
    record.serialize(&mut ser)?;
    // serde_json only ever emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GlossaryEntry;

    #[test]
    fn test_one_space_indent() {
        let entry = GlossaryEntry {
            title: "Gas".into(),
            link: "https://example.com/gas".into(),
            content: "Fee paid to \"validators\"".into(),
            ..Default::default()
        };
        assert_eq!(
            to_json(&entry).unwrap(),
            "{\n \"title\": \"Gas\",\n \"link\": \"https://example.com/gas\",\n \"content\": \"Fee paid to \\\"validators\\\"\"\n}"
        );
    }
}
