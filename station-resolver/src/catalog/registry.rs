//! The immutable station catalog.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::hierarchy::{NamedStation, NamedStationId};

/// Number of base64 characters kept from the content digest.
const HASH_LEN: usize = 10;

/// Registry of named stations, keyed by normalized name.
///
/// Named stations live in an arena indexed by [`NamedStationId`]; the key
/// index maps normalized names into it. Arena order is creation order,
/// which is also the order search walks the keys in.
#[derive(Debug, Clone)]
pub struct StationCatalog {
    stations: Vec<NamedStation>,
    by_key: HashMap<String, NamedStationId>,
    hash: String,
    generated_at: DateTime<Utc>,
}

impl StationCatalog {
    /// Freeze a set of named stations into a catalog.
    ///
    /// Ids are reassigned to match arena positions.
    pub fn new(mut stations: Vec<NamedStation>, generated_at: DateTime<Utc>) -> Self {
        let mut by_key = HashMap::with_capacity(stations.len());
        for (i, station) in stations.iter_mut().enumerate() {
            station.id = NamedStationId(i as u32);
            by_key.insert(station.key.clone(), station.id);
        }

        let hash = content_hash(&stations);

        Self {
            stations,
            by_key,
            hash,
            generated_at,
        }
    }

    /// Look up a named station by normalized name.
    pub fn get(&self, key: &str) -> Option<&NamedStation> {
        self.by_key.get(key).map(|id| &self.stations[id.index()])
    }

    /// Look up a named station by arena id.
    pub fn station(&self, id: NamedStationId) -> Option<&NamedStation> {
        self.stations.get(id.index())
    }

    /// All named stations, in arena order.
    pub fn stations(&self) -> &[NamedStation] {
        &self.stations
    }

    /// All normalized names, in arena order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.stations.iter().map(|s| s.key.as_str())
    }

    /// Content hash identifying this station set.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// When the underlying data was fetched.
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn extended_station_count(&self) -> usize {
        self.stations.iter().map(|s| s.extended_stations.len()).sum()
    }
}

/// Hash of the station set, excluding the generation timestamp.
///
/// SHA-256 over every field of the hierarchy, URL-safe base64 encoded and
/// truncated, so it can be embedded in station references as is.
pub fn content_hash(stations: &[NamedStation]) -> String {
    let mut hasher = Sha256::new();

    for named in stations {
        write_field(&mut hasher, named.key.as_bytes());
        write_field(&mut hasher, named.name.as_bytes());
        hasher.update((named.extended_stations.len() as u64).to_le_bytes());

        for extended in &named.extended_stations {
            write_optional(&mut hasher, extended.descriptor.as_deref());
            hasher.update((extended.logical_stations.len() as u64).to_le_bytes());

            for logical in &extended.logical_stations {
                write_field(&mut hasher, logical.stop_code.as_str().as_bytes());
                hasher.update(logical.location.latitude.to_bits().to_le_bytes());
                hasher.update(logical.location.longitude.to_bits().to_le_bytes());
                hasher.update(logical.contributions.to_le_bytes());
                hasher.update(logical.max_deviation_m.to_bits().to_le_bytes());
                write_optional(&mut hasher, logical.address.as_deref());
            }
        }
    }

    let digest = hasher.finalize();
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(HASH_LEN);
    encoded
}

/// Length-prefixed so that adjacent fields cannot run into each other.
fn write_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn write_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update([1u8]);
            write_field(hasher, v.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}
