//! todoctl-server: REST API over a todo store
//!
//! Routes live under `/api`; every response uses the
//! `{ success, data?, count?, message?, error?, details? }` envelope.

pub mod http;
pub mod state;

pub use http::{build_router, run_server, ApiError, ServerConfig, ServerError};
pub use state::AppState;
