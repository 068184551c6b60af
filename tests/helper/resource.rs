//! Router and resource wiring

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use http::{Method, StatusCode, Uri};
use http_body_util::BodyExt;

use badgery::badge::{BadgeContent, Color};
use badgery::config::{CacheBackend, Config, EndpointSelection};
use badgery::context::RequestContext;
use badgery::error::BadgeError;
use badgery::request::BadgeRequest;
use badgery::server::{Router, respond};
use badgery::source::Source;

/// Plain-HTTP config with an in-memory cache, pointing the registry at `server_url`
pub fn test_config(server_url: Option<&str>) -> Config {
    let mut config = Config::default();
    config.http.https_only = false;
    config.cache.backend = CacheBackend::Memory;
    config.registry.endpoint_selection = EndpointSelection::First;
    if let Some(url) = server_url {
        config.registry.feed_url = format!("{}/v3/index.json", url);
    }
    config
}

pub fn router(config: &Config) -> Router {
    Router::from_config(config).unwrap()
}

/// Issues a GET through the HTTP adapter and returns status, content type and body
pub async fn get(router: &Router, uri: &str) -> (StatusCode, String, String) {
    let uri: Uri = uri.parse().unwrap();
    let response = respond(router, &Method::GET, &uri, None).await;

    let status = response.status();
    let content_type = response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

/// Echoes the request message and color, and counts resolutions
#[derive(Default)]
pub struct CountingSource {
    calls: AtomicUsize,
}

impl CountingSource {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    async fn resolve(
        &self,
        _ctx: &RequestContext,
        request: &BadgeRequest,
    ) -> Result<BadgeContent, BadgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(BadgeContent::new(
            "counting",
            request.message.clone().unwrap_or_default(),
            request
                .color
                .as_deref()
                .and_then(Color::parse)
                .unwrap_or(Color::GREEN),
        ))
    }
}
