//! Network layer - shared HTTP transport and the typed API surface
//!
//! The transport owns the connection pool, timeouts and retry; the API
//! client maps routes to typed results.

pub mod api;
pub mod transport;

pub use api::ApiClient;
