//! Permissive cross-origin headers.
//!
//! The same three headers go on every response the relay produces:
//! preflight answers, relayed bodies, exports and errors alike. They
//! override anything the upstream sent under the same names.

use axum::http::header::{
    InvalidHeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CorsConfig;

/// Pre-validated CORS header values.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_origin: HeaderValue,
    allow_headers: HeaderValue,
    allow_methods: HeaderValue,
}

impl CorsHeaders {
    pub fn from_config(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(&config.allow_origin)?,
            allow_headers: HeaderValue::from_str(&config.allow_headers)?,
            allow_methods: HeaderValue::from_str(&config.allow_methods)?,
        })
    }

    /// Header name/value pairs, in a fixed order.
    pub fn entries(&self) -> [(HeaderName, HeaderValue); 3] {
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone()),
            (ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone()),
            (ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone()),
        ]
    }

    /// One overriding response-header layer per CORS header.
    pub fn layers(&self) -> [SetResponseHeaderLayer<HeaderValue>; 3] {
        self.entries()
            .map(|(name, value)| SetResponseHeaderLayer::overriding(name, value))
    }
}

impl Default for CorsHeaders {
    fn default() -> Self {
        Self {
            allow_origin: HeaderValue::from_static("*"),
            allow_headers: HeaderValue::from_static("Content-Type"),
            allow_methods: HeaderValue::from_static("GET, POST, OPTIONS"),
        }
    }
}
