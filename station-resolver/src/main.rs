use station_resolver::cache::{CacheConfig, CachedCtsClient};
use station_resolver::catalog::{
    AnnotateConfig, CatalogRefresher, CatalogSnapshot, CatalogStore, ClusterConfig,
    SnapshotConfig,
};
use station_resolver::config::AppConfig;
use station_resolver::cts::{CtsClient, CtsConfig};
use station_resolver::geocode::{GeocodeClient, GeocodeConfig};
use station_resolver::schedule::ScheduleConfig;
use station_resolver::search::SearchConfig;
use station_resolver::web::{AppState, create_router};
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

fn init_logger() {
    let default_level = LevelFilter::INFO;
    let rust_log =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| default_level.to_string());
    let env_filter = EnvFilter::try_new(rust_log).unwrap_or_else(|e| {
        eprintln!(
            "invalid {}, falling back to level '{}' - {}",
            EnvFilter::DEFAULT_ENV,
            default_level,
            e,
        );
        EnvFilter::new(default_level.to_string())
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();
}

#[tokio::main]
async fn main() {
    init_logger();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Create CTS client, shared by the catalog feed and the visit cache
    let cts_client =
        CtsClient::new(CtsConfig::new(&config.cts_token)).expect("Failed to create CTS client");
    let cache_config = CacheConfig::default().with_ttl(config.cache_ttl);
    let cached_cts = CachedCtsClient::new(cts_client.clone(), &cache_config);

    let geocoder =
        GeocodeClient::new(GeocodeConfig::default()).expect("Failed to create geocoding client");

    let snapshot = CatalogSnapshot::new(SnapshotConfig::new(config.snapshot_path.clone()));
    let refresher = CatalogRefresher::new(cts_client, geocoder, snapshot)
        .with_cluster_config(
            ClusterConfig::default().with_proximity_threshold(config.proximity_threshold_m),
        )
        .with_annotate_config(
            AnnotateConfig::default().with_failure_policy(config.geocode_failure_policy),
        )
        .with_load_from_snapshot(config.load_stops_from_cache);

    // Build the first catalog (fail fast if neither feed nor snapshot works)
    info!("Building station catalog...");
    let catalog = refresher
        .load_initial()
        .await
        .expect("Failed to load station catalog");
    info!(
        stations = catalog.len(),
        hash = %catalog.hash(),
        "Station catalog ready"
    );
    let store = CatalogStore::new(catalog);

    // Spawn background task to rebuild the catalog periodically
    let store_refresh = store.clone();
    let refresh_interval = config.refresh_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_interval);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            if let Err(e) = refresher.refresh(&store_refresh).await {
                error!(error = %e, "Catalog refresh failed, keeping previous catalog");
            }
        }
    });

    let state = AppState::new(
        store,
        cached_cts,
        SearchConfig::default().with_fuzzy_cutoff(config.fuzzy_cutoff),
        ScheduleConfig::default(),
    );
    let app = create_router(state);

    info!(addr = %config.bind_addr, "Station resolver listening");
    info!("  GET /health                     - Health check");
    info!("  GET /api/catalog                - Catalog hash and size");
    info!("  GET /api/stations/search?q=     - Search stations");
    info!("  GET /api/schedule/:reference    - Live departures");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server error");
}
