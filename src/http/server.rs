//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay handler on every path
//! - Wire up middleware (tracing, request ID, timeout, CORS headers)
//! - Bind server to listener
//! - Stop accepting on shutdown signal
//!
//! # Design Decisions
//! - The request deadline sits inside the CORS and request-id layers, so a
//!   timed-out request still gets those headers and a JSON error body

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::header::InvalidHeaderValue;
use axum::routing::any;
use axum::{BoxError, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::timeout::error::Elapsed;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::http::cors::CorsHeaders;
use crate::http::error::RelayError;
use crate::http::relay::Relay;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::router::relay_handler;
use crate::lifecycle::ShutdownSignal;

/// Errors building or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid header value in configuration: {0}")]
    Header(#[from] InvalidHeaderValue),

    #[error("server IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        let relay = Relay::new(&config.upstream, &config.export)?;
        let cors = CorsHeaders::from_config(&config.cors)?;

        let state = AppState {
            relay: Arc::new(relay),
        };

        let router = Self::build_router(&config, &cors, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, cors: &CorsHeaders, state: AppState) -> Router {
        let [allow_origin, allow_headers, allow_methods] = cors.layers();

        Router::new()
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_middleware_error))
                    .timeout(Duration::from_secs(config.timeouts.request_secs)),
            )
            .layer(allow_origin)
            .layer(allow_headers)
            .layer(allow_methods)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Render errors raised by middleware as relay errors.
async fn handle_middleware_error(err: BoxError) -> RelayError {
    if err.is::<Elapsed>() {
        tracing::warn!("Request deadline elapsed");
        RelayError::Timeout
    } else {
        RelayError::Service(err.to_string())
    }
}
