//! Markdown serialization: YAML front matter followed by the record body.

use serde_yaml::{Mapping, Value};

use crate::models::Record;

pub fn to_markdown<R: Record + ?Sized>(record: &R) -> Result<String, serde_yaml::Error> {
    let mut front = Mapping::new();
    for (key, value) in record.front_matter() {
        front.insert(Value::from(key), Value::from(value));
    }
    let yaml = serde_yaml::to_string(&front)?;
    Ok(format!("---\n{}---\n{}\n", yaml, record.body()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, GlossaryEntry};

    #[test]
    fn test_front_matter_then_body() {
        let entry = GlossaryEntry {
            title: "Gas".into(),
            link: "https://example.com/gas".into(),
            content: "Fee paid to validators.".into(),
            ..Default::default()
        };
        assert_eq!(
            to_markdown(&entry).unwrap(),
            "---\ntitle: Gas\nlink: https://example.com/gas\n---\nFee paid to validators.\n"
        );
    }

    #[test]
    fn test_values_needing_quotes_stay_valid_yaml() {
        let article = Article {
            id: "42".into(),
            title: "ETH: the merge".into(),
            content: "Body".into(),
            ..Default::default()
        };
        let md = to_markdown(&article).unwrap();
        let front = md
            .strip_prefix("---\n")
            .and_then(|rest| rest.split("---\n").next())
            .unwrap();
        let parsed: Mapping = serde_yaml::from_str(front).unwrap();
        assert_eq!(parsed.get("id").and_then(Value::as_str), Some("42"));
        assert_eq!(parsed.get("title").and_then(Value::as_str), Some("ETH: the merge"));
        assert!(md.ends_with("---\nBody\n"));
    }
}
