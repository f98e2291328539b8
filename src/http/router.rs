//! Request routing.
//!
//! # Responsibilities
//! - Answer CORS preflight requests directly
//! - Reject requests without a target url, or with an unsupported method
//! - Hand everything else to the relay
//!
//! # Design Decisions
//! - The decision is a pure function of method and query string
//! - GET and POST are relayed; the upstream fetch is always a GET
//! - First occurrence of a repeated query key wins

use std::time::Instant;

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::error::RelayError;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

/// What the relay should fetch, and how to return it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTarget {
    pub url: String,
    /// Convert a JSON upstream body into GeoJSON.
    pub export: bool,
}

/// Routing outcome for one request.
#[derive(Debug)]
pub enum Dispatch {
    Preflight,
    Reject(RelayError),
    Relay(RelayTarget),
}

/// The two query parameters the relay understands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayQuery {
    pub url: Option<String>,
    pub export: Option<String>,
}

impl RelayQuery {
    /// Decode a raw query string.
    pub fn parse(query: Option<&str>) -> Self {
        let mut parsed = Self::default();
        let Some(query) = query else {
            return parsed;
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                "url" => &mut parsed.url,
                "export" => &mut parsed.export,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        parsed
    }

    /// Export is enabled only by the literal string `true`.
    pub fn export_enabled(&self) -> bool {
        self.export.as_deref() == Some("true")
    }
}

/// Decide how to handle a request.
pub fn dispatch(method: &Method, query: Option<&str>) -> Dispatch {
    if method == Method::OPTIONS {
        return Dispatch::Preflight;
    }
    if method != Method::GET && method != Method::POST {
        return Dispatch::Reject(RelayError::MethodNotAllowed);
    }

    let query = RelayQuery::parse(query);
    let export = query.export_enabled();
    match query.url {
        Some(url) if !url.is_empty() => Dispatch::Relay(RelayTarget { url, export }),
        _ => Dispatch::Reject(RelayError::MissingUrl),
    }
}

/// Single entry point for every path and method.
pub async fn relay_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);

    match dispatch(&method, query.as_deref()) {
        Dispatch::Preflight => {
            metrics::record_request("preflight", StatusCode::OK, start_time);
            StatusCode::OK.into_response()
        }
        Dispatch::Reject(err) => {
            tracing::debug!(request_id = %request_id, method = %method, error = %err, "Rejecting request");
            metrics::record_request("rejected", err.status_code(), start_time);
            err.into_response()
        }
        Dispatch::Relay(target) => {
            tracing::debug!(
                request_id = %request_id,
                url = %target.url,
                export = target.export,
                "Relaying request"
            );
            let mode = if target.export { "export" } else { "proxy" };
            let response = state
                .relay
                .relay(&target)
                .await
                .unwrap_or_else(IntoResponse::into_response);
            metrics::record_request(mode, response.status(), start_time);
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_is_preflight() {
        assert!(matches!(dispatch(&Method::OPTIONS, None), Dispatch::Preflight));
        assert!(matches!(
            dispatch(&Method::OPTIONS, Some("url=https://example.com")),
            Dispatch::Preflight
        ));
    }

    #[test]
    fn test_missing_url() {
        for query in [None, Some(""), Some("export=true"), Some("url=")] {
            assert!(matches!(
                dispatch(&Method::GET, query),
                Dispatch::Reject(RelayError::MissingUrl)
            ));
        }
    }

    #[test]
    fn test_unsupported_method() {
        for method in [Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
            assert!(matches!(
                dispatch(&method, Some("url=https://example.com")),
                Dispatch::Reject(RelayError::MethodNotAllowed)
            ));
        }
    }

    #[test]
    fn test_relay_target_decoded() {
        let query = "url=https%3A%2F%2Fexample.com%2Fzones%3Flat%3D1%26lng%3D2&export=true";
        match dispatch(&Method::GET, Some(query)) {
            Dispatch::Relay(target) => {
                assert_eq!(target.url, "https://example.com/zones?lat=1&lng=2");
                assert!(target.export);
            }
            other => panic!("unexpected dispatch: {:?}", other),
        }
    }

    #[test]
    fn test_post_is_relayed() {
        assert!(matches!(
            dispatch(&Method::POST, Some("url=https://example.com")),
            Dispatch::Relay(RelayTarget { export: false, .. })
        ));
    }

    #[test]
    fn test_export_flag_is_literal() {
        for flag in ["TRUE", "1", "yes", ""] {
            let query = RelayQuery::parse(Some(&format!("url=x&export={}", flag)));
            assert!(!query.export_enabled(), "flag {:?} should not enable export", flag);
        }
        assert!(RelayQuery::parse(Some("url=x&export=true")).export_enabled());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let query = RelayQuery::parse(Some("url=https://a.example&url=https://b.example"));
        assert_eq!(query.url.as_deref(), Some("https://a.example"));
    }
}
