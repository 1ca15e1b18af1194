//! Liveness and dashboard status

use axum::{extract::State, routing::get, Json, Router};
use polis_common::config::PlotBackend;
use serde::Serialize;

use crate::AppState;

/// Service identity plus a snapshot of the dashboard's shared state
#[derive(Debug, Serialize)]
pub struct DashboardStatus {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub git_hash: &'static str,
    pub plot_backend: PlotBackend,
    /// Report identities held by the result cache
    pub cached_reports: usize,
    /// Open `/events` streams
    pub progress_subscribers: usize,
}

/// GET /health
async fn dashboard_status(State(state): State<AppState>) -> Json<DashboardStatus> {
    let services = &state.services;
    Json(DashboardStatus {
        status: "ok",
        module: "polis-dash",
        version: env!("CARGO_PKG_VERSION"),
        git_hash: env!("GIT_HASH"),
        plot_backend: services.presenter.backend(),
        cached_reports: services.cache.len().await,
        progress_subscribers: services.events.subscriber_count(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(dashboard_status))
}
