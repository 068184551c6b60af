//! JSON documents

use tracing::warn;

use crate::document::traits::{Document, DocumentFormat};
use crate::error::BadgeError;

/// Adapter for `application/json` documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocument;

impl DocumentFormat for JsonDocument {
    fn name(&self) -> &'static str {
        "json"
    }

    fn content_types(&self) -> &'static [&'static str] {
        &["application/json", "text/json"]
    }

    fn parse(&self, bytes: &[u8]) -> Result<Document, BadgeError> {
        serde_json::from_slice(bytes).map(Document::Tree).map_err(|e| {
            warn!("Failed to parse JSON document: {}", e);
            BadgeError::UnprocessableEntity(format!("Failed to parse JSON document: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_returns_tree_document() {
        let doc = JsonDocument.parse(br#"{"a":{"b":5}}"#).unwrap();

        assert_eq!(doc, Document::Tree(json!({"a": {"b": 5}})));
    }

    #[test]
    fn malformed_json_is_unprocessable() {
        let result = JsonDocument.parse(b"{\"a\":");
        assert!(matches!(result, Err(BadgeError::UnprocessableEntity(_))));
    }

    #[test]
    fn accepts_declared_json_types_only() {
        assert!(JsonDocument.accepts(None));
        assert!(JsonDocument.accepts(Some("application/json")));
        assert!(JsonDocument.accepts(Some("TEXT/JSON")));
        assert!(!JsonDocument.accepts(Some("text/html")));
    }
}
