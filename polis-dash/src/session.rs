//! Session controller: one explicit run per user trigger
//!
//! A session is `Idle` until triggered, `Running` while it validates input,
//! loads the report through the cache, applies the recipe and renders, and
//! `Idle` again afterwards whatever the result. A blank URL is the only
//! handled failure; load and recipe errors propagate to the caller.

use polis_common::events::{EventBus, RunEvent};
use polis_common::{IdentityError, ReportIdentity};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::ResultCache;
use crate::dataset::TopLabel;
use crate::error::{ApiError, ApiResult};
use crate::present::{Presenter, RenderedOutput};
use crate::recipe::Recipe;

/// Message shown when the report URL is blank
pub const EMPTY_URL_MESSAGE: &str = "Please enter a Pol.is report URL.";

/// Run lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// User input for one run
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub report: String,
    #[serde(default)]
    pub lang: Option<String>,
    /// Tags this run's progress events for `/events?run=<token>`
    #[serde(default)]
    pub run_token: Option<String>,
}

/// Successful run result
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: u64,
    pub statement_count: usize,
    pub status_message: String,
    pub zoom_levels: usize,
    pub top_labels: Vec<TopLabel>,
    pub output: RenderedOutput,
}

/// How a run ended, short of an unhandled failure
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Input validation failed; nothing was loaded
    Rejected { run_id: u64, message: String },
    Completed(Box<RunReport>),
}

/// Shared services every session uses
#[derive(Clone)]
pub struct SessionServices {
    pub cache: ResultCache,
    pub recipe: Arc<dyn Recipe>,
    pub presenter: Presenter,
    pub events: EventBus,
    /// When false the language input is ignored
    pub translation_enabled: bool,
    next_run_id: Arc<AtomicU64>,
}

impl SessionServices {
    pub fn new(
        cache: ResultCache,
        recipe: Arc<dyn Recipe>,
        presenter: Presenter,
        events: EventBus,
        translation_enabled: bool,
    ) -> Self {
        Self {
            cache,
            recipe,
            presenter,
            events,
            translation_enabled,
            next_run_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Start a new idle session
    pub fn session(&self) -> SessionController {
        SessionController {
            services: self.clone(),
            state: RunState::Idle,
        }
    }
}

/// Owns the lifecycle of runs for one user session
pub struct SessionController {
    services: SessionServices,
    state: RunState,
}

impl SessionController {
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute one run to completion
    pub async fn run(&mut self, request: RunRequest) -> ApiResult<RunOutcome> {
        let run_id = self.services.next_run_id.fetch_add(1, Ordering::Relaxed);
        let token = request
            .run_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self.state = RunState::Running;
        self.services.events.emit_lossy(RunEvent::RunStarted {
            run_id,
            token: token.clone(),
            timestamp: chrono::Utc::now(),
        });

        let result = self.execute(run_id, token.as_deref(), request).await;
        self.state = RunState::Idle;

        match &result {
            Ok(RunOutcome::Completed(report)) => {
                self.services.events.emit_lossy(RunEvent::RunCompleted {
                    run_id,
                    token,
                    statements: report.statement_count,
                    timestamp: chrono::Utc::now(),
                });
            }
            Ok(RunOutcome::Rejected { message, .. }) => {
                self.services.events.emit_lossy(RunEvent::RunRejected {
                    run_id,
                    token,
                    message: message.clone(),
                    timestamp: chrono::Utc::now(),
                });
            }
            Err(e) => {
                warn!(run_id, error = %e, "Run failed");
                self.services.events.emit_lossy(RunEvent::RunFailed {
                    run_id,
                    token,
                    error: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
            }
        }

        result
    }

    async fn execute(
        &self,
        run_id: u64,
        token: Option<&str>,
        request: RunRequest,
    ) -> ApiResult<RunOutcome> {
        let services = &self.services;

        // Step 1: validate
        let language = if services.translation_enabled {
            request.lang.as_deref()
        } else {
            None
        };
        let identity = match ReportIdentity::new(&request.report, language) {
            Ok(identity) => identity,
            Err(IdentityError::EmptyUrl) => {
                info!(run_id, "Run rejected: empty report URL");
                return Ok(RunOutcome::Rejected {
                    run_id,
                    message: EMPTY_URL_MESSAGE.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        // Step 2: load through the cache
        services.events.emit_lossy(RunEvent::LoadingReport {
            run_id,
            token: token.map(str::to_string),
            url: identity.url().to_string(),
            language: identity.language().map(str::to_string),
            timestamp: chrono::Utc::now(),
        });
        let dataset = services.cache.get_or_load(&identity).await?;
        let statement_count = dataset.statement_count();
        services.events.emit_lossy(RunEvent::ReportLoaded {
            run_id,
            token: token.map(str::to_string),
            statements: statement_count,
            timestamp: chrono::Utc::now(),
        });
        info!(run_id, identity = %identity, statements = statement_count, "Report loaded");

        // Step 3: recipe (CPU-bound)
        services.events.emit_lossy(RunEvent::RunningRecipe {
            run_id,
            token: token.map(str::to_string),
            timestamp: chrono::Utc::now(),
        });
        let recipe = Arc::clone(&services.recipe);
        let analysed = tokio::task::spawn_blocking(move || recipe.apply(dataset))
            .await
            .map_err(|e| ApiError::Internal(format!("Recipe task failed: {}", e)))??;

        // Step 4: present
        services.events.emit_lossy(RunEvent::Rendering {
            run_id,
            token: token.map(str::to_string),
            timestamp: chrono::Utc::now(),
        });
        let output = services.presenter.render(&analysed);

        Ok(RunOutcome::Completed(Box::new(RunReport {
            run_id,
            statement_count,
            status_message: format!("Loaded report with {} statements", statement_count),
            zoom_levels: analysed.label_layers.len(),
            top_labels: analysed.top_labels,
            output,
        })))
    }
}
