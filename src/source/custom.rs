use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use tracing::debug;

use crate::badge::{BadgeContent, Color, Icon};
use crate::config::BackendConfig;
use crate::context::RequestContext;
use crate::error::BadgeError;
use crate::request::BadgeRequest;
use crate::source::{BadgeDefaults, Source, badge_content};

/// A named backend producing badge text from the request
pub trait CustomBackend: Send + Sync {
    fn name(&self) -> &str;

    fn label(&self) -> &str;

    fn default_color(&self) -> Color;

    fn icon(&self) -> Option<Icon> {
        None
    }

    fn process(&self, request: &BadgeRequest) -> Result<String, BadgeError>;
}

/// Reports the running service version
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionBackend;

impl CustomBackend for VersionBackend {
    fn name(&self) -> &str {
        "version"
    }

    fn label(&self) -> &str {
        "version"
    }

    fn default_color(&self) -> Color {
        Color::GREEN
    }

    fn icon(&self) -> Option<Icon> {
        Icon::named("tag", Color::LIGHT_GREY)
    }

    fn process(&self, _request: &BadgeRequest) -> Result<String, BadgeError> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }
}

/// Backend answering with configured text
#[derive(Debug, Clone, PartialEq)]
pub struct FixedBackend {
    name: String,
    label: String,
    message: String,
    color: Color,
}

impl FixedBackend {
    pub fn from_config(config: &BackendConfig) -> anyhow::Result<Self> {
        let color = match config.color.as_deref() {
            Some(spec) => Color::parse(spec)
                .ok_or_else(|| anyhow!("Backend '{}' has an invalid color: {}", config.name, spec))?,
            None => Color::GREEN,
        };

        Ok(Self {
            name: config.name.clone(),
            label: config.label.clone(),
            message: config.message.clone(),
            color,
        })
    }
}

impl CustomBackend for FixedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn default_color(&self) -> Color {
        self.color
    }

    fn process(&self, _request: &BadgeRequest) -> Result<String, BadgeError> {
        Ok(self.message.clone())
    }
}

/// Name → backend table, built once at startup
#[derive(Default, Clone)]
pub struct BackendRegistry {
    backends: BTreeMap<String, Arc<dyn CustomBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in backends plus the fixed-text ones from configuration
    ///
    /// A configured backend replaces a built-in one of the same name.
    pub fn from_config(backends: &[BackendConfig]) -> anyhow::Result<Self> {
        let mut registry = Self::new().register(Arc::new(VersionBackend));
        for config in backends {
            registry = registry.register(Arc::new(FixedBackend::from_config(config)?));
        }
        Ok(registry)
    }

    pub fn register(mut self, backend: Arc<dyn CustomBackend>) -> Self {
        self.backends.insert(backend.name().to_string(), backend);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CustomBackend>> {
        self.backends.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }
}

/// Dispatches to the backend named by the `backendName` parameter
#[derive(Clone)]
pub struct CustomBackendSource {
    backends: Arc<BackendRegistry>,
}

impl CustomBackendSource {
    pub const NAME: &'static str = "custom";

    pub fn new(backends: Arc<BackendRegistry>) -> Self {
        Self { backends }
    }
}

#[async_trait]
impl Source for CustomBackendSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn resolve(
        &self,
        ctx: &RequestContext,
        request: &BadgeRequest,
    ) -> Result<BadgeContent, BadgeError> {
        let name = request.param("backendName").unwrap_or_default();
        let backend = self
            .backends
            .get(name)
            .ok_or_else(|| BadgeError::NotFound(format!("Unknown backend: {}", name)))?;
        debug!(request_id = ctx.request_id(), "Dispatching to custom backend {}", name);

        let text = backend.process(request)?;
        let defaults =
            BadgeDefaults::new(backend.label(), backend.default_color()).with_icon(backend.icon());
        badge_content(request, text, defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestParams;

    fn request(backend: &str, query: &[(&str, &str)]) -> BadgeRequest {
        let raw = query.iter().fold(
            RequestParams::new(format!("/custom/backend/{}", backend))
                .with_path_param("backendName", backend),
            |raw, (k, v)| raw.with_query(*k, *v),
        );
        BadgeRequest::parse(&raw).unwrap()
    }

    fn source(configs: &[BackendConfig]) -> CustomBackendSource {
        CustomBackendSource::new(Arc::new(BackendRegistry::from_config(configs).unwrap()))
    }

    fn fixed(name: &str, color: Option<&str>) -> BackendConfig {
        BackendConfig {
            name: name.to_string(),
            label: "team".to_string(),
            message: "platform".to_string(),
            color: color.map(String::from),
        }
    }

    #[tokio::test]
    async fn unknown_backend_is_not_found() {
        let result = source(&[])
            .resolve(&RequestContext::new(), &request("doesnotexist", &[]))
            .await;

        match result {
            Err(BadgeError::NotFound(message)) => assert!(message.contains("doesnotexist")),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn version_backend_reports_crate_version() {
        let content = source(&[])
            .resolve(&RequestContext::new(), &request("version", &[]))
            .await
            .unwrap();

        assert_eq!(content.label, "version");
        assert_eq!(content.text, env!("CARGO_PKG_VERSION"));
        assert_eq!(content.icon.map(|i| i.name().to_string()), Some("tag".to_string()));
    }

    #[tokio::test]
    async fn fixed_backend_uses_configured_values_and_request_color() {
        let source = source(&[fixed("team", Some("blue"))]);

        let default = source
            .resolve(&RequestContext::new(), &request("team", &[]))
            .await
            .unwrap();
        let overridden = source
            .resolve(&RequestContext::new(), &request("team", &[("color", "red")]))
            .await
            .unwrap();

        assert_eq!(default.label, "team");
        assert_eq!(default.text, "platform");
        assert_eq!(default.color, Color::new(0, 0, 255));
        assert_eq!(overridden.color, Color::RED);
    }

    #[test]
    fn invalid_configured_color_is_rejected() {
        assert!(BackendRegistry::from_config(&[fixed("team", Some("nope"))]).is_err());
    }

    #[test]
    fn registry_lists_builtin_and_configured_backends() {
        let registry = BackendRegistry::from_config(&[fixed("team", None)]).unwrap();

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["team", "version"]);
    }
}
