//! Document format trait definition

use std::collections::BTreeMap;

use serde_json::Value;

use crate::document::json_path;
use crate::document::xml_document::XmlElement;
use crate::document::xml_path;
use crate::error::BadgeError;

/// Top-level document fields that may override badge attributes
pub const OVERRIDE_FIELDS: [&str; 4] = ["label", "color", "logo", "logoColor"];

/// A parsed remote document
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// JSON, YAML and TOML documents share one value model
    Tree(Value),
    Xml(XmlElement),
}

impl Document {
    /// Evaluates `expr` and returns the matched value as text
    ///
    /// Tree documents yield the first match; XML documents yield the
    /// concatenation of every match.
    pub fn query(&self, expr: &str) -> Result<String, BadgeError> {
        let no_match = || BadgeError::BadRequest(format!("Failed to evaluate '{}' in response", expr));

        match self {
            Document::Tree(root) => json_path::select(root, expr)?
                .first()
                .map(|value| json_path::render(value))
                .ok_or_else(no_match),
            Document::Xml(root) => {
                let matches = xml_path::select(root, expr)?;
                if matches.is_empty() {
                    return Err(no_match());
                }
                Ok(matches.iter().map(xml_path::XmlMatch::render).collect())
            }
        }
    }

    /// A scalar top-level field of a map-shaped document
    pub fn field(&self, name: &str) -> Option<String> {
        match self {
            Document::Tree(Value::Object(map)) => match map.get(name)? {
                Value::Array(_) | Value::Object(_) | Value::Null => None,
                value => Some(json_path::render(value)),
            },
            _ => None,
        }
    }

    /// Badge override fields present in the document
    pub fn override_fields(&self) -> BTreeMap<String, String> {
        OVERRIDE_FIELDS
            .iter()
            .filter_map(|name| self.field(name).map(|value| (name.to_string(), value)))
            .collect()
    }
}

/// Trait for the per-format document adapters
pub trait DocumentFormat: Send + Sync {
    /// Format name as used in routes (`json`, `yaml`, ...)
    fn name(&self) -> &'static str;

    /// Mime essences this format accepts
    fn content_types(&self) -> &'static [&'static str];

    /// Parse raw bytes into a navigable document
    fn parse(&self, bytes: &[u8]) -> Result<Document, BadgeError>;

    /// A missing content type is accepted; otherwise it must be one of [`Self::content_types`]
    fn accepts(&self, content_type: Option<&str>) -> bool {
        content_type.is_none_or(|declared| {
            self.content_types()
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(declared))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tree_query_returns_first_match() {
        let doc = Document::Tree(json!({"a": {"b": 5}}));

        assert_eq!(doc.query("$.a.b").unwrap(), "5");
    }

    #[test]
    fn query_without_match_is_a_bad_request() {
        let doc = Document::Tree(json!({"a": 1}));

        assert_eq!(
            doc.query("$.b"),
            Err(BadgeError::BadRequest("Failed to evaluate '$.b' in response".to_string()))
        );
    }

    #[test]
    fn override_fields_read_scalars_of_map_documents() {
        let doc = Document::Tree(json!({
            "label": "coverage",
            "color": "red",
            "logo": {"nested": true},
            "other": "ignored"
        }));

        let fields = doc.override_fields();

        assert_eq!(
            fields,
            BTreeMap::from([
                ("color".to_string(), "red".to_string()),
                ("label".to_string(), "coverage".to_string()),
            ])
        );
    }

    #[test]
    fn non_map_documents_have_no_fields() {
        let doc = Document::Tree(json!([1, 2]));

        assert!(doc.field("prefix").is_none());
        assert!(doc.override_fields().is_empty());
    }
}
