use async_trait::async_trait;
use tracing::debug;

use crate::badge::{BadgeContent, Color};
use crate::client::HttpClient;
use crate::context::RequestContext;
use crate::document::DocumentFormat;
use crate::error::BadgeError;
use crate::request::BadgeRequest;
use crate::source::{BadgeDefaults, Source, UNDEFINED, badge_content, fetch_remote};

/// Remote document of one format, queried with the `query` parameter
///
/// The document may carry `prefix`/`suffix` for the queried text and
/// `label`/`color`/`logo`/`logoColor` overrides. Request values win.
#[derive(Clone)]
pub struct DynamicDocumentSource {
    client: HttpClient,
    format: &'static dyn DocumentFormat,
    name: String,
}

impl DynamicDocumentSource {
    pub fn new(client: HttpClient, format: &'static dyn DocumentFormat) -> Self {
        Self {
            client,
            format,
            name: format!("dynamic-{}", format.name()),
        }
    }

    pub fn format(&self) -> &'static dyn DocumentFormat {
        self.format
    }
}

#[async_trait]
impl Source for DynamicDocumentSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn resolve(
        &self,
        ctx: &RequestContext,
        request: &BadgeRequest,
    ) -> Result<BadgeContent, BadgeError> {
        let query = request
            .param("query")
            .ok_or_else(|| BadgeError::BadRequest("Missing parameter 'query'".to_string()))?;

        let body = fetch_remote(
            &self.client,
            ctx,
            request,
            |content_type| self.format.accepts(content_type),
            self.format.content_types(),
        )
        .await?;
        let document = self.format.parse(&body)?;

        let value = document.query(query)?;
        debug!("Query '{}' on {} document yielded '{}'", query, self.format.name(), value);
        let text = format!(
            "{}{}{}",
            document.field("prefix").unwrap_or_default(),
            value,
            document.field("suffix").unwrap_or_default()
        );

        let overrides = BadgeRequest::from_fields(document.override_fields())?;
        badge_content(
            &request.or(&overrides),
            text,
            BadgeDefaults::new(UNDEFINED, Color::GREEN),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::document::format_for;
    use crate::request::RequestParams;
    use mockito::{Server, ServerGuard};
    use rstest::rstest;

    fn source(format: &str) -> DynamicDocumentSource {
        let client = HttpClient::new(&HttpConfig {
            https_only: false,
            ..HttpConfig::default()
        })
        .unwrap();
        DynamicDocumentSource::new(client, format_for(format).unwrap())
    }

    async fn serve(server: &mut ServerGuard, content_type: &str, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/data")
            .with_status(200)
            .with_header("content-type", content_type)
            .with_body(body)
            .create_async()
            .await
    }

    async fn resolve(
        format: &str,
        server: &ServerGuard,
        query: &[(&str, &str)],
    ) -> Result<BadgeContent, BadgeError> {
        let raw = query.iter().fold(
            RequestParams::new(format!("/dynamic/{}", format))
                .with_query("url", format!("{}/data", server.url())),
            |raw, (k, v)| raw.with_query(*k, *v),
        );
        let request = BadgeRequest::parse(&raw)?;
        source(format).resolve(&RequestContext::new(), &request).await
    }

    #[rstest]
    #[case("json", "application/json", r#"{"a":{"b":5}}"#, "$.a.b", "5")]
    #[case("yaml", "application/x-yaml", "a:\n  b: 5\n", "$.a.b", "5")]
    #[case("toml", "application/toml", "[a]\nb = 5\n", "$.a.b", "5")]
    #[case("xml", "application/xml", "<a><b>5</b></a>", "b/text()", "5")]
    #[tokio::test]
    async fn query_result_becomes_badge_text(
        #[case] format: &str,
        #[case] content_type: &str,
        #[case] body: &str,
        #[case] query: &str,
        #[case] expected: &str,
    ) {
        let mut server = Server::new_async().await;
        let mock = serve(&mut server, content_type, body).await;

        let content = resolve(format, &server, &[("query", query)]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(content.text, expected);
        assert_eq!(content.label, UNDEFINED);
        assert_eq!(content.color, Color::GREEN);
    }

    #[tokio::test]
    async fn document_prefix_suffix_and_overrides_apply() {
        let mut server = Server::new_async().await;
        let _mock = serve(
            &mut server,
            "application/json",
            r#"{"coverage":87,"prefix":"~","suffix":"%","label":"coverage","color":"red","logo":"star"}"#,
        )
        .await;

        let content = resolve("json", &server, &[("query", "$.coverage"), ("color", "blue")])
            .await
            .unwrap();

        assert_eq!(content.text, "~87%");
        assert_eq!(content.label, "coverage");
        assert_eq!(content.color, Color::new(0, 0, 255));
        assert_eq!(content.icon.map(|i| i.name().to_string()), Some("star".to_string()));
    }

    #[tokio::test]
    async fn missing_query_is_bad_request() {
        let server = Server::new_async().await;

        let result = resolve("json", &server, &[]).await;

        assert_eq!(
            result.unwrap_err(),
            BadgeError::BadRequest("Missing parameter 'query'".to_string())
        );
    }

    #[tokio::test]
    async fn unmatched_query_is_bad_request() {
        let mut server = Server::new_async().await;
        let _mock = serve(&mut server, "application/json", r#"{"a":1}"#).await;

        let result = resolve("json", &server, &[("query", "$.b")]).await;

        assert!(matches!(result, Err(BadgeError::BadRequest(msg)) if msg.contains("$.b")));
    }

    #[tokio::test]
    async fn unexpected_content_type_is_unsupported() {
        let mut server = Server::new_async().await;
        let _mock = serve(&mut server, "application/json", r#"{"a":1}"#).await;

        let result = resolve("yaml", &server, &[("query", "$.a")]).await;

        assert!(matches!(result, Err(BadgeError::UnsupportedMediaType(_))));
    }

    #[tokio::test]
    async fn empty_body_is_service_unavailable() {
        let mut server = Server::new_async().await;
        let _mock = serve(&mut server, "application/json", "").await;

        let result = resolve("json", &server, &[("query", "$.a")]).await;

        assert!(matches!(result, Err(BadgeError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn malformed_document_is_unprocessable() {
        let mut server = Server::new_async().await;
        let _mock = serve(&mut server, "application/json", "{not json").await;

        let result = resolve("json", &server, &[("query", "$.a")]).await;

        assert!(matches!(result, Err(BadgeError::UnprocessableEntity(_))));
    }

    #[test]
    fn name_includes_format() {
        assert_eq!(source("toml").name(), "dynamic-toml");
    }
}
