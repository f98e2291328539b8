//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! router / relay / transform
//!     → logging.rs (structured tracing events, request id as correlation field)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
