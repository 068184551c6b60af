//! TOML documents

use serde_json::{Map, Number, Value};
use tracing::warn;

use crate::document::traits::{Document, DocumentFormat};
use crate::error::BadgeError;

/// Adapter for `application/toml` documents
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlDocument;

impl DocumentFormat for TomlDocument {
    fn name(&self) -> &'static str {
        "toml"
    }

    fn content_types(&self) -> &'static [&'static str] {
        &["application/toml"]
    }

    fn parse(&self, bytes: &[u8]) -> Result<Document, BadgeError> {
        let unprocessable = |reason: String| {
            warn!("Failed to parse TOML document: {}", reason);
            BadgeError::UnprocessableEntity(format!("Failed to parse TOML document: {}", reason))
        };

        let text = std::str::from_utf8(bytes).map_err(|e| unprocessable(e.to_string()))?;
        let table = text
            .parse::<toml::Table>()
            .map_err(|e| unprocessable(e.to_string()))?;

        Ok(Document::Tree(to_json(toml::Value::Table(table))))
    }
}

/// Datetimes become their RFC 3339 text; non-finite floats become strings
fn to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, to_json(value)))
                .collect::<Map<String, Value>>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const DOC: &str = r#"
name = "badgery"
count = 12
ratio = 0.5
released = 2024-05-01T10:00:00Z

[package]
version = "1.4.2"
tags = ["a", "b"]
"#;

    #[rstest]
    #[case("$.package.version", "1.4.2")]
    #[case("$.count", "12")]
    #[case("$.ratio", "0.5")]
    #[case("$.released", "2024-05-01T10:00:00Z")]
    #[case("$.package.tags[1]", "b")]
    fn parse_supports_json_path_queries(#[case] expr: &str, #[case] expected: &str) {
        let doc = TomlDocument.parse(DOC.as_bytes()).unwrap();

        assert_eq!(doc.query(expr).unwrap(), expected);
    }

    #[test]
    fn malformed_toml_is_unprocessable() {
        let result = TomlDocument.parse(b"name = ");
        assert!(matches!(result, Err(BadgeError::UnprocessableEntity(_))));
    }

    #[test]
    fn non_utf8_is_unprocessable() {
        let result = TomlDocument.parse(&[0xff, 0xfe]);
        assert!(matches!(result, Err(BadgeError::UnprocessableEntity(_))));
    }
}
