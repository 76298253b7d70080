//! Search configuration.

/// Configuration parameters for station search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of stations returned, and the cap applied to each
    /// candidate list before they are combined.
    pub max_results: usize,

    /// Fuzzy matches must score strictly below this (0 is a perfect match).
    pub fuzzy_cutoff: f64,

    /// Error ratio above which a window of a key is not a match at all.
    pub match_threshold: f64,

    /// Offset (in characters) at which a match costs one full point.
    pub location_distance: f64,

    /// Windows starting after this offset are not considered.
    pub max_offset: usize,
}

impl SearchConfig {
    pub fn with_max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }

    pub fn with_fuzzy_cutoff(mut self, cutoff: f64) -> Self {
        self.fuzzy_cutoff = cutoff;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 25,
            fuzzy_cutoff: 0.5,
            match_threshold: 0.6,
            location_distance: 100.0,
            max_offset: 60,
        }
    }
}
