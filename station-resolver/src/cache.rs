//! Caching layer for CTS stop monitoring responses.
//!
//! Live visits change slowly relative to how often a popular station is
//! queried, so each stop code's visits are cached for a short TTL. Only
//! successful responses are cached; a failed fetch is retried on the next
//! query.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::cts::{CtsClient, CtsError};
use crate::domain::{RawVisit, StopCode};
use crate::schedule::VisitProvider;

/// Cached visit list for one stop code.
type VisitEntry = Arc<Vec<RawVisit>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_capacity: 1000,
        }
    }
}

impl CacheConfig {
    /// Set a custom TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Visit provider with caching.
///
/// Wraps any [`VisitProvider`] (the live [`CtsClient`] by default) and
/// caches its responses per stop code.
pub struct CachedCtsClient<P = CtsClient> {
    client: P,
    visits: MokaCache<StopCode, VisitEntry>,
}

impl<P: VisitProvider> CachedCtsClient<P> {
    /// Create a new cached client.
    pub fn new(client: P, config: &CacheConfig) -> Self {
        let visits = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { client, visits }
    }

    /// Get visits for a stop, using the cache if available.
    pub async fn get_visits(&self, stop_code: &StopCode) -> Result<VisitEntry, CtsError> {
        if let Some(cached) = self.visits.get(stop_code).await {
            return Ok(cached);
        }

        let entry = Arc::new(self.client.fetch_visits(stop_code).await?);
        self.visits.insert(stop_code.clone(), entry.clone()).await;

        Ok(entry)
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.visits.invalidate_all();
    }
}

impl<P: VisitProvider> VisitProvider for CachedCtsClient<P> {
    async fn fetch_visits(&self, stop_code: &StopCode) -> Result<Vec<RawVisit>, CtsError> {
        let entry = self.get_visits(stop_code).await?;
        Ok(entry.as_ref().clone())
    }
}
