//! Server-Sent Events for run progress

use crate::AppState;
use axum::{
    extract::{Query, State},
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use serde::Deserialize;
use std::convert::Infallible;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Progress token sent with the run request
    pub run: String,
}

/// GET /events?run=<token> - SSE stream of one run's events
///
/// Streams ConnectionStatus on connect, then the RunEvents (RunStarted,
/// LoadingReport, ReportLoaded, RunningRecipe, ...) of the run submitted
/// with the same token. A missing `run` parameter is rejected with 400.
pub async fn event_stream(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    polis_common::sse::create_run_event_sse_stream("polis-dash", &state.services.events, query.run)
}
