use std::sync::Arc;

use async_trait::async_trait;

use crate::badge::{BadgeContent, Color, Icon};
use crate::context::RequestContext;
use crate::error::BadgeError;
use crate::registry::{RegistryMode, RegistryResolver};
use crate::request::BadgeRequest;
use crate::source::{BadgeDefaults, Source, badge_content};

/// Package registry badge in one of the [`RegistryMode`]s
#[derive(Debug, Clone)]
pub struct RegistrySource {
    resolver: Arc<RegistryResolver>,
    mode: RegistryMode,
    name: String,
}

impl RegistrySource {
    pub fn new(resolver: Arc<RegistryResolver>, mode: RegistryMode) -> Self {
        Self {
            resolver,
            mode,
            name: format!("registry-{}", mode.as_str()),
        }
    }

    pub fn mode(&self) -> RegistryMode {
        self.mode
    }
}

#[async_trait]
impl Source for RegistrySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(
        &self,
        ctx: &RequestContext,
        request: &BadgeRequest,
    ) -> Result<BadgeContent, BadgeError> {
        let package = self.resolver.resolve(ctx, request, self.mode).await?;

        let text = match self.mode {
            RegistryMode::Version | RegistryMode::VersionPrerelease => package.version.to_string(),
            RegistryMode::Downloads => package.downloads.to_string(),
        };

        let defaults = BadgeDefaults::new(self.mode.default_label(), Color::GREEN)
            .with_icon(Some(Icon::registry()));
        badge_content(request, text, defaults)
    }
}
