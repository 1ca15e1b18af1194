//! # Polis Dashboard Common Library
//!
//! Shared code for the Pol.is report dashboard including:
//! - Error and result types
//! - Configuration loading (TOML + environment + CLI priority)
//! - Report identity (the result cache key)
//! - Run status events and SSE streaming

pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod sse;

pub use error::{Error, Result};
pub use identity::{IdentityError, ReportIdentity};
