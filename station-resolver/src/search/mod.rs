//! Station name search.
//!
//! Queries are normalized, then matched against catalog keys twice: by
//! plain substring containment and by approximate substring scoring. The
//! result is flagged confident only when the query is a key and no other
//! key contains it.

mod config;
mod engine;
mod fuzzy;

pub use config::SearchConfig;
pub use engine::{SearchEngine, SearchResult};
pub use fuzzy::{match_score, rank};
