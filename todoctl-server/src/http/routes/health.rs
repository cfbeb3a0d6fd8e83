//! Health check endpoint

use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
    pub message: &'static str,
    pub backend: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub uptime_secs: i64,
}

impl HealthResponse {
    fn at(backend: &'static str, started_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            success: true,
            status: "OK",
            message: "Todo API is running",
            backend,
            version: env!("CARGO_PKG_VERSION"),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            uptime_secs: (now - started_at).num_seconds().max(0),
        }
    }
}

/// GET /api/health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::at(
        state.store().backend_type(),
        state.started_at(),
        Utc::now(),
    ))
}

/// Health routes
pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
