//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedCtsClient;
use crate::catalog::CatalogStore;
use crate::cts::CtsClient;
use crate::schedule::ScheduleConfig;
use crate::search::SearchConfig;

/// Shared application state.
///
/// Generic over the visit provider so handlers can run against the mock
/// client in tests.
pub struct AppState<P = CtsClient> {
    /// Currently published station catalog
    pub catalog: CatalogStore,

    /// Cached live-visit client
    pub visits: Arc<CachedCtsClient<P>>,

    /// Search tuning
    pub search: Arc<SearchConfig>,

    /// Visit window for schedule queries
    pub schedule: Arc<ScheduleConfig>,
}

impl<P> AppState<P> {
    /// Create a new app state.
    pub fn new(
        catalog: CatalogStore,
        visits: CachedCtsClient<P>,
        search: SearchConfig,
        schedule: ScheduleConfig,
    ) -> Self {
        Self {
            catalog,
            visits: Arc::new(visits),
            search: Arc::new(search),
            schedule: Arc::new(schedule),
        }
    }
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            visits: Arc::clone(&self.visits),
            search: Arc::clone(&self.search),
            schedule: Arc::clone(&self.schedule),
        }
    }
}
