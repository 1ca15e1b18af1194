//! Process-wide report cache
//!
//! Memoizes [`ReportSource::load`] by [`ReportIdentity`]. Entries live for
//! the life of the process: there is no eviction and no TTL. Failed loads
//! are never stored, so a retry with the same identity reaches the source
//! again.
//!
//! Concurrent misses on one identity may both call the source; the last
//! successful insert wins. The source is never called while a lock is held.

use polis_common::ReportIdentity;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::dataset::StructuredDataset;
use crate::source::{ReportSource, SourceError};

/// Keyed store of loaded reports
#[derive(Clone)]
pub struct ResultCache {
    source: Arc<dyn ReportSource>,
    entries: Arc<RwLock<HashMap<ReportIdentity, Arc<StructuredDataset>>>>,
}

impl ResultCache {
    pub fn new(source: Arc<dyn ReportSource>) -> Self {
        Self {
            source,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Return the cached dataset for `identity`, loading it on first use
    ///
    /// The caller receives its own copy; consuming it leaves the cached
    /// entry untouched.
    pub async fn get_or_load(
        &self,
        identity: &ReportIdentity,
    ) -> Result<StructuredDataset, SourceError> {
        if let Some(entry) = self.entries.read().await.get(identity) {
            debug!(identity = %identity, "Report cache hit");
            return Ok(StructuredDataset::clone(entry));
        }

        info!(
            identity = %identity,
            source = self.source.source_id(),
            "Report cache miss, loading"
        );
        let dataset = self.source.load(identity).await?;

        self.entries
            .write()
            .await
            .insert(identity.clone(), Arc::new(dataset.clone()));

        Ok(dataset)
    }

    pub async fn contains(&self, identity: &ReportIdentity) -> bool {
        self.entries.read().await.contains_key(identity)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_dataset, CountingSource};

    #[tokio::test]
    async fn test_repeated_identity_loads_once() {
        let source = Arc::new(CountingSource::new(sample_dataset(5)));
        let cache = ResultCache::new(source.clone());
        let id = ReportIdentity::new("https://pol.is/report/abc123", Some("fr")).unwrap();

        let first = cache.get_or_load(&id).await.unwrap();
        let second = cache.get_or_load(&id).await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(first, second);
        assert_eq!(second.statement_count(), 5);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_language_change_is_a_miss() {
        let source = Arc::new(CountingSource::new(sample_dataset(3)));
        let cache = ResultCache::new(source.clone());
        let url = "https://pol.is/report/abc123";

        cache.get_or_load(&ReportIdentity::new(url, None).unwrap()).await.unwrap();
        cache.get_or_load(&ReportIdentity::new(url, Some("fr")).unwrap()).await.unwrap();
        cache.get_or_load(&ReportIdentity::new(url, Some("de")).unwrap()).await.unwrap();

        assert_eq!(source.calls(), 3);
        assert_eq!(cache.len().await, 3);
        assert_eq!(
            source.languages_seen(),
            vec![None, Some("fr".to_string()), Some("de".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let source = Arc::new(CountingSource::failing());
        let cache = ResultCache::new(source.clone());
        let id = ReportIdentity::new("https://unreachable.invalid/report/x", None).unwrap();

        assert!(cache.get_or_load(&id).await.is_err());
        assert!(!cache.contains(&id).await);
        assert!(cache.is_empty().await);

        assert!(cache.get_or_load(&id).await.is_err());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_after_failure_populates() {
        let source = Arc::new(CountingSource::fail_first(sample_dataset(2)));
        let cache = ResultCache::new(source.clone());
        let id = ReportIdentity::new("https://pol.is/report/flaky", None).unwrap();

        assert!(cache.get_or_load(&id).await.is_err());
        assert_eq!(cache.get_or_load(&id).await.unwrap().statement_count(), 2);
        assert_eq!(cache.get_or_load(&id).await.unwrap().statement_count(), 2);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_consuming_copy_leaves_entry_intact() {
        let source = Arc::new(CountingSource::new(sample_dataset(4)));
        let cache = ResultCache::new(source);
        let id = ReportIdentity::new("https://pol.is/report/abc123", None).unwrap();

        let mut copy = cache.get_or_load(&id).await.unwrap();
        copy.statements.clear();

        assert_eq!(cache.get_or_load(&id).await.unwrap().statement_count(), 4);
    }
}
