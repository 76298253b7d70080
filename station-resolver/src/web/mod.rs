//! Web layer for the station resolver.
//!
//! Provides HTTP endpoints for station search and live schedules.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
