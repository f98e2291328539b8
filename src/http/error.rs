//! Relay error kinds and their HTTP rendering.
//!
//! Every failure ends as a JSON body with an `error` field. Upstream HTTP
//! errors keep the upstream's status code; everything that goes wrong
//! locally after validation is a 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type RelayResult<T> = Result<T, RelayError>;

/// Errors produced while handling one relay request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No usable `url` query parameter.
    #[error("Missing url parameter")]
    MissingUrl,

    /// Method other than GET, POST or OPTIONS.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Upstream answered with a non-success status. `reason` is the phrase
    /// from the upstream status line, possibly empty.
    #[error("{}", upstream_message(.status, .reason))]
    Upstream { status: StatusCode, reason: String },

    /// The request deadline elapsed before a response was ready.
    #[error("Request timeout")]
    Timeout,

    /// A middleware layer failed in a way the handler never saw.
    #[error("service error: {0}")]
    Service(String),

    /// Target URL could not be parsed.
    #[error("invalid target url: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The upstream request could not be completed.
    #[error("upstream fetch failed: {0}")]
    Fetch(#[source] reqwest::Error),

    /// The upstream body could not be read.
    #[error("failed to read upstream body: {0}")]
    Body(#[source] reqwest::Error),

    /// The upstream body was declared JSON but did not parse.
    #[error("invalid JSON from upstream: {0}")]
    Json(#[from] serde_json::Error),
}

impl RelayError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingUrl => StatusCode::BAD_REQUEST,
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Upstream { status, .. } => *status,
            RelayError::Timeout => StatusCode::REQUEST_TIMEOUT,
            RelayError::InvalidUrl { .. }
            | RelayError::Service(_)
            | RelayError::Fetch(_)
            | RelayError::Body(_)
            | RelayError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures of the relay itself, as opposed to caller or
    /// upstream errors.
    pub fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
            && !matches!(self, RelayError::Upstream { .. })
    }
}

/// `HTTP <code>: <reason>`, or just `HTTP <code>` without a reason phrase.
fn upstream_message(status: &StatusCode, reason: &str) -> String {
    if reason.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), reason)
    }
}

/// JSON error body.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&RelayError> for ErrorBody {
    fn from(err: &RelayError) -> Self {
        if !err.is_internal() {
            return Self {
                error: err.to_string(),
                message: None,
                details: None,
            };
        }

        let details = match err {
            RelayError::InvalidUrl { url, .. } => Some(url.clone()),
            _ => None,
        };
        Self {
            error: "Internal server error".to_string(),
            message: Some(err.to_string()),
            details,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!(error = %self, "Relay error");
        }
        (self.status_code(), Json(ErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_body() {
        let body = serde_json::to_string(&ErrorBody::from(&RelayError::MissingUrl)).unwrap();
        assert_eq!(body, r#"{"error":"Missing url parameter"}"#);
        assert_eq!(RelayError::MissingUrl.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_error_keeps_status() {
        let err = RelayError::Upstream {
            status: StatusCode::NOT_FOUND,
            reason: "Not Found".into(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(!err.is_internal());
        let body = serde_json::to_string(&ErrorBody::from(&err)).unwrap();
        assert_eq!(body, r#"{"error":"HTTP 404: Not Found"}"#);
    }

    #[test]
    fn test_upstream_500_is_not_internal() {
        let err = RelayError::Upstream {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            reason: "Internal Server Error".into(),
        };
        assert!(!err.is_internal());
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
    }

    #[test]
    fn test_upstream_without_reason_has_no_separator() {
        let err = RelayError::Upstream {
            status: StatusCode::from_u16(599).unwrap(),
            reason: String::new(),
        };
        assert_eq!(err.status_code().as_u16(), 599);
        assert_eq!(err.to_string(), "HTTP 599");
    }

    #[test]
    fn test_timeout_body() {
        let err = RelayError::Timeout;
        assert_eq!(err.status_code(), StatusCode::REQUEST_TIMEOUT);
        assert!(!err.is_internal());
        let body = serde_json::to_string(&ErrorBody::from(&err)).unwrap();
        assert_eq!(body, r#"{"error":"Request timeout"}"#);
    }

    #[test]
    fn test_invalid_url_body() {
        let source = url::Url::parse("not a url").unwrap_err();
        let err = RelayError::InvalidUrl {
            url: "not a url".into(),
            source,
        };
        let body = ErrorBody::from(&err);
        assert_eq!(body.error, "Internal server error");
        assert_eq!(body.message.as_deref(), Some("invalid target url: relative URL without a base"));
        assert_eq!(body.details.as_deref(), Some("not a url"));
    }

    #[test]
    fn test_json_error_is_internal() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = RelayError::from(source);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody::from(&err);
        assert!(body.message.unwrap().starts_with("invalid JSON from upstream"));
    }
}
