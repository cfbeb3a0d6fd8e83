//! HTTP layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing
//! - Graceful shutdown followed by store teardown
//! - JSON envelope responses, including errors

pub mod error;
pub mod extractors;
pub mod response;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use response::Envelope;
pub use server::{build_router, run_server, ServerConfig, ServerError};
