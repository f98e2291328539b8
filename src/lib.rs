//! CORS relay for airspace zone data.
//!
//! Fetches a caller-supplied URL server-side and returns it with permissive
//! cross-origin headers, optionally converting zone JSON into GeoJSON.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod transform;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
