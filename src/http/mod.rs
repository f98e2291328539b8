//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → server.rs (middleware: request id, trace, CORS headers, timeout)
//!     → router.rs (preflight | reject | relay)
//!     → relay.rs (upstream GET, pass-through or export)
//!         → transform (zone JSON → GeoJSON) when exporting
//!     → error.rs renders any failure as a JSON body
//! ```

pub mod cors;
pub mod error;
pub mod relay;
pub mod request;
pub mod router;
pub mod server;

pub use error::{ErrorBody, RelayError, RelayResult};
pub use relay::Relay;
pub use request::X_REQUEST_ID;
pub use router::{dispatch, Dispatch, RelayTarget};
pub use server::{HttpServer, ServerError};
