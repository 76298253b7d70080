//! Incremental geospatial clustering of raw stops.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{Stop, normalize};

use super::config::ClusterConfig;
use super::hierarchy::{ExtendedStation, LogicalStation, NamedStation, NamedStationId};
use super::registry::StationCatalog;

/// Builds the station hierarchy one stop at a time.
///
/// Each stop joins the extended station whose average location is nearest,
/// if that is within the proximity threshold. This is a single greedy pass;
/// the result depends on stop order, so feed stops in a deterministic
/// order.
#[derive(Debug, Default)]
pub struct StationClusterer {
    config: ClusterConfig,
    stations: Vec<NamedStation>,
    by_key: HashMap<String, NamedStationId>,
}

impl StationClusterer {
    pub fn new(config: ClusterConfig) -> Self {
        Self {
            config,
            stations: Vec::new(),
            by_key: HashMap::new(),
        }
    }

    /// Add one stop to the hierarchy.
    pub fn add_stop(&mut self, stop: &Stop) {
        let key = normalize(&stop.name);
        let threshold = self.config.proximity_threshold_m;

        let id = match self.by_key.get(&key) {
            Some(id) => *id,
            None => {
                let id = NamedStationId(self.stations.len() as u32);
                self.stations
                    .push(NamedStation::new(id, key.clone(), stop.name.clone()));
                self.by_key.insert(key, id);
                id
            }
        };
        let named = &mut self.stations[id.index()];

        // Earliest-created wins ties: only a strictly smaller distance
        // replaces the current best.
        let nearest = named
            .extended_stations
            .iter()
            .enumerate()
            .filter_map(|(i, e)| {
                e.average_location()
                    .map(|avg| (i, avg.distance_to(&stop.location)))
            })
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((i, d)),
            });

        if let Some((i, _)) = nearest
            && let Some(logical) = named.extended_stations[i].logical_mut(&stop.code)
        {
            logical.absorb(stop.location);
            return;
        }

        let logical = LogicalStation::new(stop.code.clone(), stop.location);
        match nearest {
            Some((i, d)) if d <= threshold => {
                named.extended_stations[i].logical_stations.push(logical);
            }
            _ => {
                if nearest.is_some() {
                    debug!(
                        name = %named.name,
                        stop_code = %stop.code,
                        "Stop is far from existing places, creating extended station"
                    );
                }
                named.extended_stations.push(ExtendedStation::new(logical));
            }
        }
    }

    /// Named stations built so far, in creation order.
    pub fn stations(&self) -> &[NamedStation] {
        &self.stations
    }

    /// Mutable access for annotation before freezing.
    pub fn stations_mut(&mut self) -> &mut [NamedStation] {
        &mut self.stations
    }

    /// Freeze the hierarchy into a catalog.
    pub fn finish(self, generated_at: DateTime<Utc>) -> StationCatalog {
        StationCatalog::new(self.stations, generated_at)
    }
}
