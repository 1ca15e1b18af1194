//! HTTP API handlers for polis-dash

pub mod health;
pub mod run;
pub mod sse;
pub mod ui;

pub use health::health_routes;
pub use run::run_json;
pub use sse::event_stream;
pub use ui::{run_analysis, serve_app_js, serve_index};
