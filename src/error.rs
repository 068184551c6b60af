use http::StatusCode;
use thiserror::Error;

/// Classified failure of a badge resolution.
///
/// Every variant carries a human-readable message; [`BadgeError::status`]
/// gives the HTTP classification used at the server boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BadgeError {
    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("{0}")]
    Gateway(String),

    #[error("{0}")]
    Internal(String),
}

impl BadgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            BadgeError::Parse(_) | BadgeError::BadRequest(_) => StatusCode::BAD_REQUEST,
            BadgeError::NotFound(_) => StatusCode::NOT_FOUND,
            BadgeError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            BadgeError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            BadgeError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BadgeError::Gateway(_) => StatusCode::BAD_GATEWAY,
            BadgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short classification name, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            BadgeError::Parse(_) => "parse",
            BadgeError::NotFound(_) => "not_found",
            BadgeError::BadRequest(_) => "bad_request",
            BadgeError::UnsupportedMediaType(_) => "unsupported_media_type",
            BadgeError::ServiceUnavailable(_) => "service_unavailable",
            BadgeError::UnprocessableEntity(_) => "unprocessable_entity",
            BadgeError::Gateway(_) => "gateway",
            BadgeError::Internal(_) => "internal",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BadgeError::Parse(m)
            | BadgeError::NotFound(m)
            | BadgeError::BadRequest(m)
            | BadgeError::UnsupportedMediaType(m)
            | BadgeError::ServiceUnavailable(m)
            | BadgeError::UnprocessableEntity(m)
            | BadgeError::Gateway(m)
            | BadgeError::Internal(m) => m,
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(BadgeError::Parse("x".into()), 400)]
    #[case(BadgeError::BadRequest("x".into()), 400)]
    #[case(BadgeError::NotFound("x".into()), 404)]
    #[case(BadgeError::UnsupportedMediaType("x".into()), 415)]
    #[case(BadgeError::UnprocessableEntity("x".into()), 422)]
    #[case(BadgeError::Gateway("x".into()), 502)]
    #[case(BadgeError::ServiceUnavailable("x".into()), 503)]
    #[case(BadgeError::Internal("x".into()), 500)]
    fn status_maps_each_classification(#[case] error: BadgeError, #[case] expected: u16) {
        assert_eq!(error.status().as_u16(), expected);
    }

    #[test]
    fn display_is_the_bare_message() {
        let error = BadgeError::NotFound("Unknown backend: doesnotexist".to_string());
        assert_eq!(error.to_string(), "Unknown backend: doesnotexist");
        assert_eq!(error.message(), "Unknown backend: doesnotexist");
    }
}
