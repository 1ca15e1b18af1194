//! Run status events
//!
//! Each session step emits a [`RunEvent`] so the UI can show progress
//! indicators while a report loads and the recipe runs. Events carry the
//! progress token the browser attached to its run request; SSE subscribers
//! only see events bearing their own token. Untagged events reach bus
//! subscribers but no browser.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Session progress notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunEvent {
    /// Trigger received, session entered Running
    RunStarted {
        run_id: u64,
        token: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Validation failed, session aborted before loading
    RunRejected {
        run_id: u64,
        token: Option<String>,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Report download (or cache lookup) in progress
    LoadingReport {
        run_id: u64,
        token: Option<String>,
        url: String,
        language: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Report available
    ReportLoaded {
        run_id: u64,
        token: Option<String>,
        statements: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis recipe in progress
    RunningRecipe {
        run_id: u64,
        token: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Presentation in progress
    Rendering {
        run_id: u64,
        token: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session finished with output
    RunCompleted {
        run_id: u64,
        token: Option<String>,
        statements: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session ended with an unhandled failure
    RunFailed {
        run_id: u64,
        token: Option<String>,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl RunEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            RunEvent::RunStarted { .. } => "RunStarted",
            RunEvent::RunRejected { .. } => "RunRejected",
            RunEvent::LoadingReport { .. } => "LoadingReport",
            RunEvent::ReportLoaded { .. } => "ReportLoaded",
            RunEvent::RunningRecipe { .. } => "RunningRecipe",
            RunEvent::Rendering { .. } => "Rendering",
            RunEvent::RunCompleted { .. } => "RunCompleted",
            RunEvent::RunFailed { .. } => "RunFailed",
        }
    }

    /// Progress token of the run that emitted this event
    pub fn token(&self) -> Option<&str> {
        match self {
            RunEvent::RunStarted { token, .. }
            | RunEvent::RunRejected { token, .. }
            | RunEvent::LoadingReport { token, .. }
            | RunEvent::ReportLoaded { token, .. }
            | RunEvent::RunningRecipe { token, .. }
            | RunEvent::Rendering { token, .. }
            | RunEvent::RunCompleted { token, .. }
            | RunEvent::RunFailed { token, .. } => token.as_deref(),
        }
    }

    /// True for the event that ends a run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunEvent::RunCompleted { .. } | RunEvent::RunRejected { .. } | RunEvent::RunFailed { .. }
        )
    }

    pub fn run_id(&self) -> u64 {
        match self {
            RunEvent::RunStarted { run_id, .. }
            | RunEvent::RunRejected { run_id, .. }
            | RunEvent::LoadingReport { run_id, .. }
            | RunEvent::ReportLoaded { run_id, .. }
            | RunEvent::RunningRecipe { run_id, .. }
            | RunEvent::Rendering { run_id, .. }
            | RunEvent::RunCompleted { run_id, .. }
            | RunEvent::RunFailed { run_id, .. } => *run_id,
        }
    }
}

/// Broadcast channel for run events
///
/// Cloning is cheap; all clones share one channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RunEvent>,
}

impl EventBus {
    /// Creates a new EventBus buffering `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: RunEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit_lossy(RunEvent::RunStarted {
            run_id: 7,
            token: Some("t1".to_string()),
            timestamp: chrono::Utc::now(),
        });
        bus.emit_lossy(RunEvent::ReportLoaded {
            run_id: 7,
            token: Some("t1".to_string()),
            statements: 42,
            timestamp: chrono::Utc::now(),
        });

        let first = rx.recv().await.unwrap();
        assert_eq!(first.event_type(), "RunStarted");
        let second = rx.recv().await.unwrap();
        assert!(matches!(second, RunEvent::ReportLoaded { statements: 42, .. }));
        assert_eq!(second.run_id(), 7);
        assert_eq!(second.token(), Some("t1"));
        assert!(!second.is_terminal());
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit_lossy(RunEvent::RunningRecipe {
            run_id: 1,
            token: None,
            timestamp: chrono::Utc::now(),
        });
    }

    #[test]
    fn test_serialized_with_type_tag() {
        let event = RunEvent::RunRejected {
            run_id: 3,
            token: None,
            message: "Please enter a Pol.is report URL.".to_string(),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "RunRejected");
        assert_eq!(json["run_id"], 3);
        assert!(json["token"].is_null());
        assert!(event.is_terminal());
    }
}
