//! Badge sources
//! - shield.rs: static text from the request
//! - registry.rs: package registry versions and download counts
//! - custom.rs: named custom backends
//! - endpoint.rs: remote badge description documents
//! - dynamic.rs: remote documents queried by a path expression

pub mod custom;
pub mod dynamic;
pub mod endpoint;
pub mod registry;
pub mod shield;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::badge::{BadgeContent, Color, Icon};
use crate::client::HttpClient;
use crate::context::RequestContext;
use crate::error::BadgeError;
use crate::request::BadgeRequest;

pub use custom::{BackendRegistry, CustomBackend, CustomBackendSource};
pub use dynamic::DynamicDocumentSource;
pub use endpoint::EndpointSource;
pub use registry::RegistrySource;
pub use shield::ShieldSource;

/// Placeholder for badge text that neither the request nor the source supplied
pub const UNDEFINED: &str = "<undefined>";

/// Produces badge content from a normalized request
///
/// Implementations are shared by every request and must not keep
/// request-dependent state.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Source: Send + Sync {
    /// Resource type name, used to qualify cache keys
    fn name(&self) -> &str;

    async fn resolve(
        &self,
        ctx: &RequestContext,
        request: &BadgeRequest,
    ) -> Result<BadgeContent, BadgeError>;
}

/// Name → source table, built once by the composition root
#[derive(Default, Clone)]
pub struct SourceRegistry {
    sources: BTreeMap<String, Arc<dyn Source>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, source: Arc<dyn Source>) -> Self {
        self.sources.insert(source.name().to_string(), source);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Source>> {
        self.sources.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}

/// Source-specific fallbacks for attributes the request leaves out
#[derive(Debug, Clone)]
pub struct BadgeDefaults {
    pub label: String,
    pub color: Color,
    pub icon: Option<Icon>,
}

impl BadgeDefaults {
    pub fn new(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            color,
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: Option<Icon>) -> Self {
        self.icon = icon;
        self
    }
}

/// Combines resolved text with the request's badge attributes and the source defaults
pub fn badge_content(
    request: &BadgeRequest,
    text: impl Into<String>,
    defaults: BadgeDefaults,
) -> Result<BadgeContent, BadgeError> {
    let label = request.label.clone().unwrap_or(defaults.label);
    let color = parse_color(request.color.as_deref(), defaults.color)?;
    let label_color = request
        .label_color
        .as_deref()
        .map(|spec| parse_color(Some(spec), Color::BLACK))
        .transpose()?;
    let icon = match request.logo.as_deref() {
        Some(name) => Some(named_icon(name, request.logo_color.as_deref())?),
        None => defaults.icon,
    };

    Ok(BadgeContent::new(label, text, color)
        .with_label_color(label_color)
        .with_icon(icon))
}

/// Hex or catalog color; an explicit but unknown value is rejected
pub fn parse_color(spec: Option<&str>, default: Color) -> Result<Color, BadgeError> {
    match spec {
        None => Ok(default),
        Some(spec) => Color::parse(spec)
            .ok_or_else(|| BadgeError::BadRequest(format!("Invalid color: {}", spec))),
    }
}

/// Catalog logo tinted with `logo_color`, light grey when absent or invalid
pub fn named_icon(name: &str, logo_color: Option<&str>) -> Result<Icon, BadgeError> {
    let color = logo_color
        .and_then(|spec| {
            let parsed = Color::parse(spec);
            if parsed.is_none() {
                debug!("Ignoring invalid logo color '{}'", spec);
            }
            parsed
        })
        .unwrap_or(Color::LIGHT_GREY);

    Icon::named(name, color).ok_or_else(|| BadgeError::BadRequest(format!("Unknown logo: {}", name)))
}

/// Fetches the `url` request parameter and checks status, content type and body
pub(crate) async fn fetch_remote(
    client: &HttpClient,
    ctx: &RequestContext,
    request: &BadgeRequest,
    accepts: impl Fn(Option<&str>) -> bool,
    expected: &[&str],
) -> Result<Bytes, BadgeError> {
    let url = request.required_param("url")?;
    let response = client.get(ctx, url).await?.ensure_ok(url)?;

    let content_type = response.content_type();
    if !accepts(content_type.as_deref()) {
        return Err(BadgeError::UnsupportedMediaType(format!(
            "Expected content type: {}, got {}",
            expected.join(", "),
            content_type.unwrap_or_default()
        )));
    }

    if response.body.is_empty() {
        return Err(BadgeError::ServiceUnavailable("Request yielded no data".to_string()));
    }

    Ok(response.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestParams;

    fn request(query: &[(&str, &str)]) -> BadgeRequest {
        let raw = query
            .iter()
            .fold(RequestParams::new("/badge/x"), |raw, (k, v)| raw.with_query(*k, *v));
        BadgeRequest::parse(&raw).unwrap()
    }

    #[test]
    fn badge_content_prefers_request_over_defaults() {
        let request = request(&[("label", "mine"), ("color", "blue"), ("labelColor", "white")]);
        let defaults = BadgeDefaults::new("default", Color::GREEN).with_icon(Some(Icon::registry()));

        let content = badge_content(&request, "text", defaults).unwrap();

        assert_eq!(content.label, "mine");
        assert_eq!(content.color, Color::new(0, 0, 255));
        assert_eq!(content.label_color, Some(Color::new(255, 255, 255)));
        assert_eq!(content.icon.map(|i| i.name().to_string()), Some("nuget".to_string()));
    }

    #[test]
    fn badge_content_falls_back_to_defaults() {
        let content = badge_content(&request(&[]), "text", BadgeDefaults::new("shield", Color::GREEN)).unwrap();

        assert_eq!(content.label, "shield");
        assert_eq!(content.color, Color::GREEN);
        assert_eq!(content.label_color, None);
        assert!(content.icon.is_none());
    }

    #[test]
    fn invalid_color_is_a_bad_request() {
        let result = badge_content(&request(&[("color", "notacolor")]), "t", BadgeDefaults::new("l", Color::GREEN));

        assert_eq!(
            result.unwrap_err(),
            BadgeError::BadRequest("Invalid color: notacolor".to_string())
        );
    }

    #[test]
    fn logo_uses_logo_color_or_light_grey() {
        let tinted = named_icon("star", Some("red")).unwrap();
        let fallback = named_icon("star", Some("bogus")).unwrap();
        let default = named_icon("star", None).unwrap();

        assert_eq!(tinted.color(), Color::RED);
        assert_eq!(fallback.color(), Color::LIGHT_GREY);
        assert_eq!(default.color(), Color::LIGHT_GREY);
    }

    #[test]
    fn unknown_logo_is_a_bad_request() {
        assert!(matches!(named_icon("nope", None), Err(BadgeError::BadRequest(_))));
    }

    #[test]
    fn source_registry_looks_up_by_name() {
        let mut source = MockSource::new();
        source.expect_name().return_const("shield".to_string());

        let registry = SourceRegistry::new().register(Arc::new(source));

        assert!(registry.get("shield").is_some());
        assert!(registry.get("other").is_none());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["shield"]);
    }
}
