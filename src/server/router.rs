use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::badge::{BadgeRenderer, SvgRenderer};
use crate::cache;
use crate::client::HttpClient;
use crate::config::Config;
use crate::context::RequestContext;
use crate::document;
use crate::error::BadgeError;
use crate::registry::{RegistryMode, RegistryResolver};
use crate::request::RequestParams;
use crate::resource::BadgeResource;
use crate::server::route::RouteTemplate;
use crate::source::{
    BackendRegistry, CustomBackendSource, DynamicDocumentSource, EndpointSource, RegistrySource,
    ShieldSource, Source, SourceRegistry,
};

#[derive(Clone)]
struct Route {
    template: RouteTemplate,
    resource: BadgeResource,
}

/// Badge routes in registration order; the first matching template wins
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, template: &str, resource: BadgeResource) -> Self {
        self.routes.push(Route {
            template: RouteTemplate::parse(template),
            resource,
        });
        self
    }

    /// Composition root: builds every source once and wires it to the shared cache
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = HttpClient::new(&config.http)?;
        let store = cache::from_config(&config.cache)?;
        let renderer: Arc<dyn BadgeRenderer> = Arc::new(SvgRenderer);
        let ttl = Duration::from_secs(config.cache.default_ttl_secs);

        let sources = source_registry(config, client)?;
        let resource = |name: &str| -> anyhow::Result<BadgeResource> {
            let source = sources
                .get(name)
                .ok_or_else(|| anyhow::anyhow!("Source {} is not registered", name))?;
            Ok(BadgeResource::new(source, store.clone(), renderer.clone(), ttl))
        };

        let mut router = Self::new()
            .route("/badge/{text}", resource(ShieldSource::NAME)?)
            .route("/custom/backend/{backendName}", resource(CustomBackendSource::NAME)?)
            .route("/endpoint", resource(EndpointSource::NAME)?);
        for mode in RegistryMode::ALL {
            router = router.route(
                &format!("/registry/{}/{{packageName}}", mode.as_str()),
                resource(&format!("registry-{}", mode.as_str()))?,
            );
        }
        for format in document::formats() {
            router = router.route(
                &format!("/dynamic/{}", format.name()),
                resource(&format!("dynamic-{}", format.name()))?,
            );
        }

        info!("Registered {} badge routes", router.routes.len());
        Ok(router)
    }

    /// Route templates in registration order
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|route| route.template.as_str())
    }

    /// Resolves one badge call to rendered markup and its content type
    pub async fn render(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: Option<&str>,
    ) -> Result<(String, &'static str), BadgeError> {
        let (route, captures) = self
            .routes
            .iter()
            .find_map(|route| route.template.matches(path).map(|captures| (route, captures)))
            .ok_or_else(|| BadgeError::NotFound(format!("No badge route matches {}", path)))?;
        debug!("{} matched {}", path, route.template.as_str());

        let raw = captures
            .into_iter()
            .fold(RequestParams::from_uri(path, query), |raw, (key, value)| {
                raw.with_path_param(key, value)
            });

        let markup = route.resource.handle(ctx, &raw).await?;
        Ok((markup, route.resource.content_type()))
    }
}

fn source_registry(config: &Config, client: HttpClient) -> anyhow::Result<SourceRegistry> {
    let backends = Arc::new(BackendRegistry::from_config(&config.backends)?);
    let resolver = Arc::new(RegistryResolver::new(client.clone(), &config.registry));

    let mut sources = SourceRegistry::new()
        .register(Arc::new(ShieldSource))
        .register(Arc::new(CustomBackendSource::new(backends)))
        .register(Arc::new(EndpointSource::new(client.clone())));
    for mode in RegistryMode::ALL {
        sources = sources.register(Arc::new(RegistrySource::new(resolver.clone(), mode)));
    }
    for format in document::formats() {
        let source: Arc<dyn Source> = Arc::new(DynamicDocumentSource::new(client.clone(), *format));
        sources = sources.register(source);
    }

    debug!("Sources: {}", sources.names().collect::<Vec<_>>().join(", "));
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheBackend;

    fn config() -> Config {
        let mut config = Config::default();
        config.http.https_only = false;
        config.cache.backend = CacheBackend::Disabled;
        config
    }

    #[test]
    fn from_config_registers_every_route() {
        let router = Router::from_config(&config()).unwrap();

        let templates: Vec<&str> = router.templates().collect();

        assert_eq!(
            templates,
            vec![
                "/badge/{text}",
                "/custom/backend/{backendName}",
                "/endpoint",
                "/registry/v/{packageName}",
                "/registry/vpre/{packageName}",
                "/registry/dt/{packageName}",
                "/dynamic/json",
                "/dynamic/yaml",
                "/dynamic/toml",
                "/dynamic/xml",
            ]
        );
    }

    #[tokio::test]
    async fn render_dispatches_by_path() {
        let router = Router::from_config(&config()).unwrap();

        let (markup, content_type) = router
            .render(&RequestContext::new(), "/badge/build_passing", Some("label=ci"))
            .await
            .unwrap();

        assert_eq!(content_type, "image/svg+xml");
        assert!(markup.contains("build passing"));
        assert!(markup.contains("ci"));
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let router = Router::from_config(&config()).unwrap();

        let result = router.render(&RequestContext::new(), "/nope", None).await;

        assert!(matches!(result, Err(BadgeError::NotFound(_))));
    }
}
