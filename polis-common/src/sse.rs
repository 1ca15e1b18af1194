//! Server-Sent Events (SSE) utilities
//!
//! Streams one run's [`RunEvent`]s to the browser that started it, so the
//! dashboard can show progress indicators while the run is in flight.

use crate::events::{EventBus, RunEvent};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Events from `bus` tagged with `token`, in emission order
///
/// Subscribes immediately; events emitted before the call are not seen.
/// Lagging subscribers skip the events they missed rather than ending.
pub fn run_events_for(bus: &EventBus, token: String) -> impl Stream<Item = RunEvent> {
    let mut rx = bus.subscribe();

    async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) if event.token() == Some(token.as_str()) => yield event,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE: client lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => {
                    debug!("SSE: event bus closed");
                    break;
                }
            }
        }
    }
}

/// Create an SSE stream of the run events tagged with `token`
///
/// Starts with a `ConnectionStatus: connected` event, sent once the
/// subscription exists, so a client may wait for it before starting the run.
pub fn create_run_event_sse_stream(
    service_name: &'static str,
    bus: &EventBus,
    token: String,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = run_events_for(bus, token);
    info!(
        subscribers = bus.subscriber_count(),
        "New SSE client connected to {} run events", service_name
    );

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            debug!(run_id = event.run_id(), "SSE: forwarding {}", event.event_type());
            if let Some(sse_event) = to_sse_event(&event) {
                yield Ok(sse_event);
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}

fn to_sse_event(event: &RunEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(event.event_type()).data(json)),
        Err(e) => {
            warn!("SSE: failed to serialize {}: {}", event.event_type(), e);
            None
        }
    }
}
