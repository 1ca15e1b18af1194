//! polis-dash library - Pol.is report dashboard
//!
//! Loads a Pol.is report by URL, runs the statements recipe over it and
//! renders the resulting statement map in the browser.

use axum::Router;
use polis_common::config::DashboardConfig;
use polis_common::events::EventBus;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cache;
pub mod dataset;
pub mod error;
pub mod present;
pub mod recipe;
pub mod session;
pub mod source;

#[cfg(test)]
mod testing;

pub use crate::error::{ApiError, ApiResult};

use crate::cache::ResultCache;
use crate::present::Presenter;
use crate::recipe::StatementsRecipe;
use crate::session::SessionServices;
use crate::source::{PolisClient, ReportSource, SourceError};

/// Run events buffered per SSE subscriber
const EVENT_CAPACITY: usize = 100;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Cache, recipe, presenter and event bus shared by all sessions
    pub services: SessionServices,
    pub config: Arc<DashboardConfig>,
}

impl AppState {
    /// Create application state over an arbitrary report source
    pub fn new(config: DashboardConfig, source: Arc<dyn ReportSource>) -> Self {
        let services = SessionServices::new(
            ResultCache::new(source),
            Arc::new(StatementsRecipe::new(config.recipe.clone())),
            Presenter::new(config.plot_backend, config.placeholder_image_url.clone()),
            EventBus::new(EVENT_CAPACITY),
            config.translation_enabled,
        );

        Self {
            services,
            config: Arc::new(config),
        }
    }

    /// Create application state backed by the Pol.is HTTP client
    pub fn with_polis_client(config: DashboardConfig) -> Result<Self, SourceError> {
        let client = PolisClient::new(Duration::from_secs(config.http_timeout_secs))?;
        Ok(Self::new(config, Arc::new(client)))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::serve_index))
        .route("/run", post(api::run_analysis))
        .route("/api/run", post(api::run_json))
        .route("/events", get(api::event_stream))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
