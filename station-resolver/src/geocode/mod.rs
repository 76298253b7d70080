//! Reverse geocoding via the French national address API.
//!
//! Used only during catalog rebuilds, to tell apart stations that share a
//! name. Each lookup turns a position into a street, postal code and city.

mod client;
mod error;

pub use client::{Address, GeocodeClient, GeocodeConfig};
pub use error::GeocodeError;
