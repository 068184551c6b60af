//! Cache-aside badge pipeline shared by every route

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::badge::BadgeRenderer;
use crate::cache::{CacheStore, fingerprint};
use crate::context::RequestContext;
use crate::error::BadgeError;
use crate::request::{BadgeRequest, RequestParams};
use crate::source::Source;

/// One source wired to the shared cache and renderer
///
/// Concurrent misses on the same key are not deduplicated: both resolve
/// and the later write replaces the earlier one.
#[derive(Clone)]
pub struct BadgeResource {
    source: Arc<dyn Source>,
    cache: Arc<dyn CacheStore>,
    renderer: Arc<dyn BadgeRenderer>,
    default_ttl: Duration,
}

impl BadgeResource {
    pub fn new(
        source: Arc<dyn Source>,
        cache: Arc<dyn CacheStore>,
        renderer: Arc<dyn BadgeRenderer>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            renderer,
            default_ttl,
        }
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn content_type(&self) -> &'static str {
        self.renderer.content_type()
    }

    /// Returns cached markup for the request, resolving and storing it on a miss
    pub async fn handle(
        &self,
        ctx: &RequestContext,
        raw: &RequestParams,
    ) -> Result<String, BadgeError> {
        let request = BadgeRequest::parse(raw)?;
        let key = fingerprint(self.source.name(), raw);

        match self.cache.get(&key) {
            Ok(Some(markup)) => {
                info!(request_id = ctx.request_id(), "Cache hit for {}", key);
                return Ok(markup);
            }
            Ok(None) => info!(request_id = ctx.request_id(), "Cache miss for {}", key),
            Err(e) => warn!("Cache lookup for {} failed, resolving: {}", key, e),
        }

        let content = self.source.resolve(ctx, &request).await?;
        debug!("Resolved {:?}", content);
        let markup = self.renderer.render(&content, request.style());

        let ttl = request
            .cache_seconds
            .map(Duration::from_secs)
            .unwrap_or(self.default_ttl);
        if let Err(e) = self.cache.set(&key, &markup, ttl) {
            warn!("Failed to cache {}: {}", key, e);
        }

        Ok(markup)
    }
}
