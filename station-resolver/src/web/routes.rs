//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use tracing::{error, warn};

use crate::catalog::path::decode;
use crate::domain::LookupError;
use crate::schedule::{ScheduleAggregator, VisitProvider};
use crate::search::SearchEngine;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<P: VisitProvider + 'static>(state: AppState<P>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/catalog", get(catalog_info::<P>))
        .route("/api/stations/search", get(search_stations::<P>))
        .route("/api/schedule/:reference", get(station_schedule::<P>))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Hash and size of the published catalog.
async fn catalog_info<P>(State(state): State<AppState<P>>) -> Json<CatalogInfo> {
    let catalog = state.catalog.current().await;
    Json(CatalogInfo::from_catalog(&catalog))
}

/// Search stations by name.
async fn search_stations<P>(
    State(state): State<AppState<P>>,
    Query(req): Query<StationSearchRequest>,
) -> Result<Json<StationSearchResponse>, AppError> {
    let catalog = state.catalog.current().await;
    let result = SearchEngine::new(&catalog, (*state.search).clone()).search(&req.q)?;

    let stations = result
        .stations
        .into_iter()
        .map(|station| StationResult::from_station(&catalog, station))
        .collect();

    Ok(Json(StationSearchResponse {
        confident: result.confident,
        stations,
    }))
}

/// Live departures for the place a reference points at.
async fn station_schedule<P: VisitProvider>(
    State(state): State<AppState<P>>,
    Path(reference): Path<String>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let catalog = state.catalog.current().await;
    let (named, extended) = decode(&reference, &catalog)?;

    let now = Utc::now();
    let report = ScheduleAggregator::new(state.visits.as_ref(), (*state.schedule).clone())
        .schedule_at(&extended.stop_codes(), now)
        .await?;

    Ok(Json(ScheduleResponse::from_report(
        named.name.clone(),
        extended.descriptor.clone(),
        &report,
        now,
    )))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Conflict { message }
            | AppError::Unavailable { message }
            | AppError::Internal { message } => message,
        }
    }
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        let message = e.to_string();
        match e {
            LookupError::NotFound { .. } => AppError::NotFound { message },
            LookupError::InvalidReference { .. } => AppError::BadRequest { message },
            LookupError::StaleReference { .. } => AppError::Conflict { message },
            LookupError::ScheduleUnavailable { .. } => AppError::Unavailable { message },
            LookupError::Contract(_) => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        if status.is_server_error() {
            error!(%status, message = self.message(), "Request failed");
        } else {
            warn!(%status, message = self.message(), "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.message().to_string(),
        });
        (status, body).into_response()
    }
}
