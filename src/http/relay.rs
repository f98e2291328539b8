//! Upstream fetch and response shaping.
//!
//! # Responsibilities
//! - Fetch the target url with a GET
//! - Surface upstream HTTP errors with the upstream's own status
//! - Pass bodies through byte for byte, minus headers that break cross-origin use
//! - Convert JSON bodies to GeoJSON when export is requested
//!
//! # Design Decisions
//! - One shared client; no retries, no caching, no fetch timeout
//! - JSON detection is a case-sensitive substring match on Content-Type
//! - Bodies are buffered, not streamed
//! - The client does no content decoding, so relayed bytes keep their
//!   upstream `Content-Encoding` and charset

use std::time::Instant;

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{Extensions, StatusCode};
use axum::response::{IntoResponse, Response};
use hyper::ext::ReasonPhrase;
use reqwest::redirect::Policy;
use serde_json::Value;
use url::Url;

use crate::config::{ExportConfig, UpstreamConfig};
use crate::http::error::{RelayError, RelayResult};
use crate::http::router::RelayTarget;
use crate::http::server::ServerError;
use crate::observability::metrics;
use crate::transform;

/// Content type of exported documents.
pub const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";

/// Upstream headers never forwarded to the caller.
pub const STRIPPED_HEADERS: [HeaderName; 12] = [
    header::CONTENT_SECURITY_POLICY,
    header::X_FRAME_OPTIONS,
    header::X_CONTENT_TYPE_OPTIONS,
    // Recomputed from the buffered body.
    header::CONTENT_LENGTH,
    // Hop-by-hop.
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// True when a Content-Type value declares JSON.
pub fn is_json_content_type(content_type: &str) -> bool {
    content_type.contains("application/json") || content_type.contains("text/json")
}

/// Copy upstream headers, dropping [`STRIPPED_HEADERS`].
pub fn forwarded_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if !STRIPPED_HEADERS.contains(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

/// Reason phrase of an upstream status line.
///
/// The HTTP/1 client only records the phrase when it differs from the
/// canonical one for the status, so absence means canonical.
pub fn reason_phrase(status: StatusCode, extensions: &Extensions) -> String {
    match extensions.get::<ReasonPhrase>() {
        Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
        None => status.canonical_reason().unwrap_or("").to_string(),
    }
}

/// Fetches targets and builds the caller-facing response.
#[derive(Debug, Clone)]
pub struct Relay {
    client: reqwest::Client,
    content_disposition: HeaderValue,
}

impl Relay {
    pub fn new(upstream: &UpstreamConfig, export: &ExportConfig) -> Result<Self, ServerError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(upstream.user_agent.as_str())
            .redirect(Policy::limited(upstream.max_redirects));
        if !upstream.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        let content_disposition =
            HeaderValue::from_str(&format!("attachment; filename=\"{}\"", export.filename))?;

        Ok(Self {
            client,
            content_disposition,
        })
    }

    /// Fetch the target and return either the relayed body or its GeoJSON
    /// export.
    pub async fn relay(&self, target: &RelayTarget) -> RelayResult<Response> {
        let url = Url::parse(&target.url).map_err(|source| RelayError::InvalidUrl {
            url: target.url.clone(),
            source,
        })?;

        let started = Instant::now();
        let upstream = self
            .client
            .get(url)
            .send()
            .await
            .map_err(RelayError::Fetch)?;
        metrics::record_upstream_duration(started);

        let status = upstream.status();
        if !status.is_success() {
            tracing::warn!(url = %target.url, status = %status, "Upstream returned an error");
            let reason = reason_phrase(status, upstream.extensions());
            return Err(RelayError::Upstream { status, reason });
        }

        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if target.export && is_json_content_type(content_type) {
            let body = upstream.bytes().await.map_err(RelayError::Body)?;
            let document: Value = serde_json::from_slice(&body)?;
            return self.export(&document);
        }

        let headers = forwarded_headers(upstream.headers());
        let body = upstream.bytes().await.map_err(RelayError::Body)?;

        let mut response = (status, body).into_response();
        *response.headers_mut() = headers;
        Ok(response)
    }

    /// Render a document as a downloadable GeoJSON attachment.
    fn export(&self, document: &Value) -> RelayResult<Response> {
        let conversion = transform::convert(document);
        metrics::record_zones_skipped(conversion.skipped);
        tracing::info!(
            features = conversion.collection.len(),
            skipped = conversion.skipped,
            "Exported zones as GeoJSON"
        );

        let body = serde_json::to_vec(&conversion.collection)?;
        Ok((
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(GEOJSON_CONTENT_TYPE),
                ),
                (header::CONTENT_DISPOSITION, self.content_disposition.clone()),
            ],
            body,
        )
            .into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_detection() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("text/json"));
        assert!(!is_json_content_type("APPLICATION/JSON"));
        assert!(!is_json_content_type("text/html"));
        assert!(!is_json_content_type(""));
    }

    #[test]
    fn test_forwarded_headers_strip_list() {
        let mut upstream = HeaderMap::new();
        upstream.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        upstream.insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static("default-src 'self'"));
        upstream.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        upstream.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        upstream.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        upstream.insert(header::CONTENT_LENGTH, HeaderValue::from_static("120"));
        upstream.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        upstream.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        upstream.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let headers = forwarded_headers(&upstream);
        assert_eq!(headers.len(), 4);
        assert_eq!(headers[header::CONTENT_TYPE], "text/html");
        assert_eq!(headers[header::CONTENT_ENCODING], "gzip");
        assert!(headers.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(headers.get_all(header::SET_COOKIE).iter().count(), 2);
        assert!(headers.get(header::CONTENT_SECURITY_POLICY).is_none());
    }

    #[test]
    fn test_reason_phrase_defaults_to_canonical() {
        let extensions = Extensions::new();
        assert_eq!(reason_phrase(StatusCode::NOT_FOUND, &extensions), "Not Found");
        assert_eq!(reason_phrase(StatusCode::from_u16(599).unwrap(), &extensions), "");
    }

    #[test]
    fn test_reason_phrase_prefers_upstream() {
        let mut extensions = Extensions::new();
        extensions.insert(ReasonPhrase::from_static(b"Zone Gone"));
        assert_eq!(reason_phrase(StatusCode::NOT_FOUND, &extensions), "Zone Gone");
    }

    #[test]
    fn test_content_disposition_from_config() {
        let relay = Relay::new(&UpstreamConfig::default(), &ExportConfig::default()).unwrap();
        assert_eq!(
            relay.content_disposition,
            "attachment; filename=\"dji-geozones.geojson\""
        );
    }

    #[tokio::test]
    async fn test_export_response() {
        let relay = Relay::new(&UpstreamConfig::default(), &ExportConfig::default()).unwrap();
        let response = relay
            .export(&json!({"zones": [{"id": "Z", "coordinates": [[0, 0]]}]}))
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()[header::CONTENT_TYPE], GEOJSON_CONTENT_TYPE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["features"][0]["properties"]["id"], "Z");
    }
}
