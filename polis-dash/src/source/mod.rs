//! Report source adapters
//!
//! A [`ReportSource`] turns a [`ReportIdentity`] into a freshly loaded
//! [`StructuredDataset`]. The production adapter is [`PolisClient`], which
//! downloads a report's CSV exports over HTTP.

use async_trait::async_trait;
use polis_common::ReportIdentity;
use thiserror::Error;

use crate::dataset::StructuredDataset;

mod polis;

pub use polis::{PolisClient, ReportLocation};

/// Report source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Invalid report URL {url}: {reason}")]
    InvalidReportUrl { url: String, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No conversation found for report {0}")]
    ConversationNotFound(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::Network(e.to_string())
    }
}

impl From<csv_async::Error> for SourceError {
    fn from(e: csv_async::Error) -> Self {
        SourceError::Parse(e.to_string())
    }
}

/// Loads a report by identity
///
/// Implementations must be idempotent: the cache may call `load` more than
/// once for the same identity when sessions race.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Adapter identifier for logging
    fn source_id(&self) -> &'static str;

    /// Fetch and parse the report named by `identity`
    ///
    /// When `identity.language()` is `Some`, statement content is returned
    /// translated into that language.
    async fn load(&self, identity: &ReportIdentity) -> Result<StructuredDataset, SourceError>;
}
