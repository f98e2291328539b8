//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! collected and returned together.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::RelayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("export.filename must not be empty")]
    EmptyFilename,

    #[error("export.filename '{0}' must not contain quotes or path separators")]
    InvalidFilename(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("{field}: '{value}' is not a valid header value")]
    InvalidHeaderValue { field: &'static str, value: String },

    #[error("observability.log_level: '{0}' is not a valid filter directive")]
    InvalidLogLevel(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let filename = &config.export.filename;
    if filename.is_empty() {
        errors.push(ValidationError::EmptyFilename);
    } else if filename.contains(&['"', '/', '\\'][..]) {
        errors.push(ValidationError::InvalidFilename(filename.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let cors = &config.cors;
    for (field, value) in [
        ("cors.allow_origin", &cors.allow_origin),
        ("cors.allow_headers", &cors.allow_headers),
        ("cors.allow_methods", &cors.allow_methods),
        ("upstream.user_agent", &config.upstream.user_agent),
    ] {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::InvalidHeaderValue {
                field,
                value: value.clone(),
            });
        }
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
