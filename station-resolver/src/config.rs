//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::catalog::{GeocodeFailurePolicy, InvalidFailurePolicy, SnapshotConfig};

/// Default interval between catalog rebuilds (6 hours).
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 6 * 60 * 60;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

const DEFAULT_PROXIMITY_THRESHOLD_M: f64 = 150.0;

const DEFAULT_FUZZY_CUTOFF: f64 = 0.5;

const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// Errors from reading the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error(transparent)]
    FailurePolicy(#[from] InvalidFailurePolicy),
}

/// Settings for the server binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// CTS API token; empty means every feed call will be refused.
    pub cts_token: String,

    /// Where the catalog snapshot lives.
    pub snapshot_path: PathBuf,

    /// Start from the snapshot instead of rebuilding from the feed.
    pub load_stops_from_cache: bool,

    pub bind_addr: SocketAddr,

    /// Time between background catalog rebuilds.
    pub refresh_interval: Duration,

    pub geocode_failure_policy: GeocodeFailurePolicy,

    /// Distance (meters) under which same-named stops are one place.
    pub proximity_threshold_m: f64,

    /// Fuzzy search matches must score below this.
    pub fuzzy_cutoff: f64,

    /// Lifetime of cached live visits.
    pub cache_ttl: Duration,
}

impl AppConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    ///
    /// Recognized variables: `CTS_TOKEN`, `SNAPSHOT_PATH`,
    /// `LOAD_STOPS_FROM_CACHE`, `BIND_ADDR`, `REFRESH_INTERVAL_SECS`,
    /// `GEOCODE_FAILURE_POLICY`, `PROXIMITY_THRESHOLD_M`, `FUZZY_CUTOFF`
    /// and `CACHE_TTL_SECS`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cts_token = lookup("CTS_TOKEN").unwrap_or_else(|| {
            warn!("CTS_TOKEN not set. Feed calls will fail.");
            String::new()
        });

        let snapshot_path = lookup("SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| SnapshotConfig::default().path);

        let load_stops_from_cache = lookup("LOAD_STOPS_FROM_CACHE")
            .is_some_and(|v| v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("true"));

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid {
                name: "BIND_ADDR",
                value: bind_addr.clone(),
            })?;

        let refresh_interval = Duration::from_secs(parse_var(
            &lookup,
            "REFRESH_INTERVAL_SECS",
            DEFAULT_REFRESH_INTERVAL_SECS,
            |secs| secs > 0,
        )?);

        let geocode_failure_policy = match lookup("GEOCODE_FAILURE_POLICY") {
            Some(value) => value.parse()?,
            None => GeocodeFailurePolicy::default(),
        };

        let proximity_threshold_m = parse_var(
            &lookup,
            "PROXIMITY_THRESHOLD_M",
            DEFAULT_PROXIMITY_THRESHOLD_M,
            |m: f64| m.is_finite() && m > 0.0,
        )?;

        let fuzzy_cutoff = parse_var(
            &lookup,
            "FUZZY_CUTOFF",
            DEFAULT_FUZZY_CUTOFF,
            |c: f64| c > 0.0 && c <= 1.0,
        )?;

        let cache_ttl = Duration::from_secs(parse_var(
            &lookup,
            "CACHE_TTL_SECS",
            DEFAULT_CACHE_TTL_SECS,
            |secs| secs > 0,
        )?);

        Ok(Self {
            cts_token,
            snapshot_path,
            load_stops_from_cache,
            bind_addr,
            refresh_interval,
            geocode_failure_policy,
            proximity_threshold_m,
            fuzzy_cutoff,
            cache_ttl,
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    valid: impl Fn(T) -> bool,
) -> Result<T, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(default);
    };

    match value.trim().parse::<T>() {
        Ok(parsed) if valid(parsed) => Ok(parsed),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config(&[]).unwrap();

        assert_eq!(config.cts_token, "");
        assert_eq!(config.snapshot_path, SnapshotConfig::default().path);
        assert!(!config.load_stops_from_cache);
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.refresh_interval, Duration::from_secs(21_600));
        assert_eq!(config.geocode_failure_policy, GeocodeFailurePolicy::Abort);
        assert_eq!(config.proximity_threshold_m, 150.0);
        assert_eq!(config.fuzzy_cutoff, 0.5);
        assert_eq!(config.cache_ttl, Duration::from_secs(30));
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("CTS_TOKEN", "secret"),
            ("SNAPSHOT_PATH", "/var/lib/stations.json"),
            ("LOAD_STOPS_FROM_CACHE", "YES"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("REFRESH_INTERVAL_SECS", "600"),
            ("GEOCODE_FAILURE_POLICY", "degrade"),
            ("PROXIMITY_THRESHOLD_M", "200"),
            ("FUZZY_CUTOFF", "0.35"),
            ("CACHE_TTL_SECS", "45"),
        ])
        .unwrap();

        assert_eq!(config.cts_token, "secret");
        assert_eq!(config.snapshot_path, PathBuf::from("/var/lib/stations.json"));
        assert!(config.load_stops_from_cache);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.refresh_interval, Duration::from_secs(600));
        assert_eq!(config.geocode_failure_policy, GeocodeFailurePolicy::Degrade);
        assert_eq!(config.proximity_threshold_m, 200.0);
        assert_eq!(config.fuzzy_cutoff, 0.35);
        assert_eq!(config.cache_ttl, Duration::from_secs(45));
    }

    #[test]
    fn cache_flag_only_accepts_yes_or_true() {
        assert!(config(&[("LOAD_STOPS_FROM_CACHE", "true")]).unwrap().load_stops_from_cache);
        assert!(!config(&[("LOAD_STOPS_FROM_CACHE", "no")]).unwrap().load_stops_from_cache);
        assert!(!config(&[("LOAD_STOPS_FROM_CACHE", "1")]).unwrap().load_stops_from_cache);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("BIND_ADDR", "localhost")]),
            Err(ConfigError::Invalid { name: "BIND_ADDR", .. })
        ));
        assert!(matches!(
            config(&[("REFRESH_INTERVAL_SECS", "0")]),
            Err(ConfigError::Invalid { name: "REFRESH_INTERVAL_SECS", .. })
        ));
        assert!(matches!(
            config(&[("PROXIMITY_THRESHOLD_M", "-5")]),
            Err(ConfigError::Invalid { name: "PROXIMITY_THRESHOLD_M", .. })
        ));
        assert!(matches!(
            config(&[("FUZZY_CUTOFF", "1.5")]),
            Err(ConfigError::Invalid { name: "FUZZY_CUTOFF", .. })
        ));
        assert!(matches!(
            config(&[("CACHE_TTL_SECS", "soon")]),
            Err(ConfigError::Invalid { name: "CACHE_TTL_SECS", .. })
        ));
        assert!(matches!(
            config(&[("GEOCODE_FAILURE_POLICY", "shrug")]),
            Err(ConfigError::FailurePolicy(_))
        ));
    }
}
