//! Request-scoped correlation context
//!
//! Passed by reference through every call of the resolution chain instead
//! of living in thread-local or global state.

use uuid::Uuid;

/// Response header carrying the request id
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: String,
}

impl RequestContext {
    /// Creates a context with a fresh random request id
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Creates a context with a caller-supplied request id
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Span that tags every event of this request with its id
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("request", request_id = %self.request_id)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
