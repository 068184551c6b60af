use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::badge::{BadgeContent, Color};
use crate::client::HttpClient;
use crate::context::RequestContext;
use crate::document::{Document, DocumentFormat, JsonDocument};
use crate::error::BadgeError;
use crate::request::BadgeRequest;
use crate::source::{BadgeDefaults, Source, badge_content, fetch_remote};

const SCHEMA_VERSION: &str = "1";

/// Badge described entirely by a remote JSON document
///
/// ```json
/// {"schemaVersion": "1", "label": "build", "message": "passing", "color": "green"}
/// ```
#[derive(Debug, Clone)]
pub struct EndpointSource {
    client: HttpClient,
}

impl EndpointSource {
    pub const NAME: &'static str = "endpoint";

    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Source for EndpointSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn resolve(
        &self,
        ctx: &RequestContext,
        request: &BadgeRequest,
    ) -> Result<BadgeContent, BadgeError> {
        let body = fetch_remote(
            &self.client,
            ctx,
            request,
            |content_type| JsonDocument.accepts(content_type),
            JsonDocument.content_types(),
        )
        .await?;
        let document = JsonDocument.parse(&body)?;
        let described = EndpointBadge::read(&document)?;
        debug!("Endpoint document describes '{}: {}'", described.label, described.message);

        let merged = request.or(&described.as_request()?);
        badge_content(&merged, described.message, BadgeDefaults::new(described.label, Color::GREEN))
    }
}

/// Validated endpoint document
#[derive(Debug, Clone, PartialEq)]
struct EndpointBadge {
    label: String,
    message: String,
    color: Option<String>,
    label_color: Option<String>,
    is_error: bool,
    named_logo: Option<String>,
    logo_color: Option<String>,
}

impl EndpointBadge {
    fn read(document: &Document) -> Result<Self, BadgeError> {
        let schema_version = match document {
            Document::Tree(Value::Object(map)) => map.get("schemaVersion").and_then(Value::as_str),
            _ => None,
        };
        if schema_version != Some(SCHEMA_VERSION) {
            return Err(BadgeError::UnprocessableEntity(
                "Expected a JSON object with 'schemaVersion': \"1\"".to_string(),
            ));
        }

        let required = |name: &str| {
            document.field(name).ok_or_else(|| {
                BadgeError::UnprocessableEntity(format!("Endpoint document is missing '{}'", name))
            })
        };

        Ok(Self {
            label: required("label")?,
            message: required("message")?,
            color: document.field("color"),
            label_color: document.field("labelColor"),
            is_error: document
                .field("isError")
                .is_some_and(|value| value.eq_ignore_ascii_case("true")),
            named_logo: document.field("namedLogo"),
            logo_color: document.field("logoColor"),
        })
    }

    /// Document attributes in request form, so request values can take precedence
    fn as_request(&self) -> Result<BadgeRequest, BadgeError> {
        let color = match (&self.color, self.is_error) {
            (Some(color), _) => Some(color.clone()),
            (None, true) => Some("red".to_string()),
            (None, false) => None,
        };

        let fields: BTreeMap<String, String> = [
            ("color", color),
            ("labelColor", self.label_color.clone()),
            ("logo", self.named_logo.clone()),
            ("logoColor", self.logo_color.clone()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name.to_string(), value)))
        .collect();

        BadgeRequest::from_fields(fields)
    }
}
