//! Health check and statistics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::publisher::PublisherStatsSnapshot;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub provider: String,
    pub topics: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub topics: usize,
    pub notifications: PublisherStatsSnapshot,
}

/// GET / - Liveness banner
pub async fn root() -> &'static str {
    "Hello, world\n"
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        provider: state.provider.name().to_string(),
        topics: state.registry.len(),
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        topics: state.registry.len(),
        notifications: state.publisher.stats(),
    })
}
