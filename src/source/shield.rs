use async_trait::async_trait;

use crate::badge::{BadgeContent, Color};
use crate::context::RequestContext;
use crate::error::BadgeError;
use crate::request::BadgeRequest;
use crate::source::{BadgeDefaults, Source, badge_content};

/// Static badge: every attribute comes from the request
#[derive(Debug, Clone, Copy, Default)]
pub struct ShieldSource;

impl ShieldSource {
    pub const NAME: &'static str = "shield";
}

#[async_trait]
impl Source for ShieldSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn resolve(
        &self,
        _ctx: &RequestContext,
        request: &BadgeRequest,
    ) -> Result<BadgeContent, BadgeError> {
        let text = request.message.clone().unwrap_or_default();
        badge_content(request, text, BadgeDefaults::new("shield", Color::GREEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestParams;

    async fn resolve(raw: RequestParams) -> Result<BadgeContent, BadgeError> {
        let request = BadgeRequest::parse(&raw)?;
        ShieldSource.resolve(&RequestContext::new(), &request).await
    }

    #[tokio::test]
    async fn resolve_uses_normalized_text_and_defaults() {
        let content = resolve(RequestParams::new("/badge/build_passing").with_path_param("text", "build_passing"))
            .await
            .unwrap();

        assert_eq!(content.label, "shield");
        assert_eq!(content.text, "build passing");
        assert_eq!(content.color, Color::GREEN);
        assert!(content.icon.is_none());
    }

    #[tokio::test]
    async fn resolve_applies_request_attributes() {
        let content = resolve(
            RequestParams::new("/badge/ok")
                .with_path_param("text", "ok")
                .with_query("label", "status--check")
                .with_query("color", "ff0000")
                .with_query("logo", "check")
                .with_query("logoColor", "white"),
        )
        .await
        .unwrap();

        assert_eq!(content.label, "status-check");
        assert_eq!(content.color, Color::RED);
        let icon = content.icon.unwrap();
        assert_eq!(icon.name(), "check");
        assert_eq!(icon.color(), Color::new(255, 255, 255));
    }

    #[tokio::test]
    async fn resolve_rejects_invalid_color() {
        let result = resolve(
            RequestParams::new("/badge/ok")
                .with_path_param("text", "ok")
                .with_query("color", "not-a-color"),
        )
        .await;

        assert!(matches!(result, Err(BadgeError::BadRequest(_))));
    }
}
