//! JSON run endpoint
//!
//! POST /api/run runs one session and returns a summary instead of the
//! rendered page. A blank URL is reported as `status: "rejected"`.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::dataset::TopLabel;
use crate::error::ApiResult;
use crate::session::{RunOutcome, RunRequest};
use crate::AppState;

/// Run summary response
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: u64,
    /// "completed" or "rejected"
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statements: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_levels: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_labels: Vec<TopLabel>,
}

/// POST /api/run
pub async fn run_json(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> ApiResult<Json<RunSummary>> {
    let outcome = state.services.session().run(request).await?;

    let summary = match outcome {
        RunOutcome::Rejected { run_id, message } => RunSummary {
            run_id,
            status: "rejected".to_string(),
            message,
            statements: None,
            zoom_levels: None,
            top_labels: Vec::new(),
        },
        RunOutcome::Completed(run) => {
            let run = *run;
            RunSummary {
                run_id: run.run_id,
                status: "completed".to_string(),
                message: run.status_message,
                statements: Some(run.statement_count),
                zoom_levels: Some(run.zoom_levels),
                top_labels: run.top_labels,
            }
        }
    };

    Ok(Json(summary))
}
