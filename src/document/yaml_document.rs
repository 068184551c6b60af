//! YAML documents

use tracing::warn;

use crate::document::traits::{Document, DocumentFormat};
use crate::error::BadgeError;

/// Adapter for YAML documents, read into the same value model as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDocument;

impl DocumentFormat for YamlDocument {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn content_types(&self) -> &'static [&'static str] {
        &["application/x-yaml", "text/yaml", "application/yaml"]
    }

    fn parse(&self, bytes: &[u8]) -> Result<Document, BadgeError> {
        serde_yaml::from_slice::<serde_json::Value>(bytes)
            .map(Document::Tree)
            .map_err(|e| {
                warn!("Failed to parse YAML document: {}", e);
                BadgeError::UnprocessableEntity(format!("Failed to parse YAML document: {}", e))
            })
    }
}
