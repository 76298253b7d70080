//! Free-text station search.

use tracing::debug;

use crate::catalog::{NamedStation, StationCatalog};
use crate::domain::{LookupError, normalize};

use super::config::SearchConfig;
use super::fuzzy::rank;

/// Stations matching a query.
#[derive(Debug, Clone)]
pub struct SearchResult<'a> {
    /// True when the query names exactly one station and nothing else
    /// contains it.
    pub confident: bool,
    /// Best candidates first.
    pub stations: Vec<&'a NamedStation>,
}

/// Resolves queries against one catalog version.
pub struct SearchEngine<'a> {
    catalog: &'a StationCatalog,
    config: SearchConfig,
}

impl<'a> SearchEngine<'a> {
    pub fn new(catalog: &'a StationCatalog, config: SearchConfig) -> Self {
        Self { catalog, config }
    }

    /// Find the stations a user most likely meant by `query`.
    ///
    /// Keys containing the normalized query come first, shortest first,
    /// followed by fuzzy matches that are not already listed.
    pub fn search(&self, query: &str) -> Result<SearchResult<'a>, LookupError> {
        let pattern = normalize(query);
        if pattern.is_empty() {
            return Err(LookupError::NotFound {
                query: query.to_string(),
            });
        }

        let mut contained: Vec<&'a str> = self
            .catalog
            .keys()
            .filter(|key| key.contains(pattern.as_str()))
            .collect();

        if let [only] = contained.as_slice()
            && *only == pattern
        {
            let station = self.station(only)?;
            debug!(query, key = %pattern, "Exact station match");
            return Ok(SearchResult {
                confident: true,
                stations: vec![station],
            });
        }

        contained.truncate(self.config.max_results);
        contained.sort_by_key(|key| key.len());

        let fuzzy = rank(&pattern, self.catalog.keys(), &self.config);

        let mut keys = contained;
        for (key, _) in fuzzy {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys.truncate(self.config.max_results);

        if keys.is_empty() {
            return Err(LookupError::NotFound {
                query: query.to_string(),
            });
        }

        debug!(query, key = %pattern, results = keys.len(), "Station search");

        let stations = keys
            .into_iter()
            .map(|key| self.station(key))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SearchResult {
            confident: false,
            stations,
        })
    }

    fn station(&self, key: &str) -> Result<&'a NamedStation, LookupError> {
        self.catalog.get(key).ok_or_else(|| LookupError::NotFound {
            query: key.to_string(),
        })
    }
}
