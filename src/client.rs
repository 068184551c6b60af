//! Upstream HTTP client

use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::context::{REQUEST_ID_HEADER, RequestContext};
use crate::error::BadgeError;

/// Status, headers and body of one upstream call
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    /// The declared mime essence (`type/subtype`), lowercased, without parameters
    ///
    /// A header that is not a valid mime type is returned as its raw lowercased
    /// text, so it never reads as an absent header.
    pub fn content_type(&self) -> Option<String> {
        let value = self.headers.get(http::header::CONTENT_TYPE)?;
        let text = String::from_utf8_lossy(value.as_bytes());
        let declared = match text.parse::<mime::Mime>() {
            Ok(mime) => mime.essence_str().to_string(),
            Err(_) => text.trim().to_string(),
        };
        Some(declared.to_ascii_lowercase())
    }

    /// Fails with a gateway error unless the upstream answered 200
    pub fn ensure_ok(self, url: &str) -> Result<Self, BadgeError> {
        if self.status != StatusCode::OK {
            return Err(BadgeError::Gateway(format!(
                "Failed to call {}. Result {}",
                url,
                self.status.as_u16()
            )));
        }
        Ok(self)
    }
}

/// Thin wrapper around reqwest with a fixed per-call timeout and no retries
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, BadgeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .https_only(config.https_only)
            .build()
            .map_err(|e| BadgeError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// GET carrying the request id upstream
    pub async fn get(&self, ctx: &RequestContext, url: &str) -> Result<HttpResponse, BadgeError> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(ctx.request_id()) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
        self.send(Method::GET, url, headers, None).await
    }

    /// Performs one request; any transport-level failure becomes a gateway error
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<HttpResponse, BadgeError> {
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| gateway(url, e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| gateway(url, e))?;

        debug!("{} answered {} ({} bytes)", url, status, body.len());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn gateway(url: &str, error: reqwest::Error) -> BadgeError {
    warn!("Request to {} failed: {}", url, error);
    let reason = if error.is_timeout() {
        "timed out".to_string()
    } else {
        error.to_string()
    };
    BadgeError::Gateway(format!("Failed to call {}: {}", url, reason))
}
