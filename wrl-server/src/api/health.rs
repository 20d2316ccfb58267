//! Liveness endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// Commit the binary was built from (`unknown` outside a git checkout)
    pub git_hash: &'static str,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    /// Catalog providers searched by every query
    pub catalogs: [&'static str; 3],
}

/// GET /health
///
/// Answers without contacting any catalog.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime_seconds = (Utc::now() - state.startup_time).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok",
        module: "wrl-server",
        version: env!("CARGO_PKG_VERSION"),
        git_hash: env!("GIT_HASH"),
        started_at: state.startup_time,
        uptime_seconds,
        catalogs: state.aggregator.provider_names(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
