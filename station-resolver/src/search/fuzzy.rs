//! Approximate substring scoring.
//!
//! A key is scored by its best-matching window: the edit distance between
//! the pattern and a slice of the key about as long as the pattern, relative
//! to the pattern length, plus a penalty for how far into the key the slice
//! starts. Lower is better; an identical key scores 0.

use super::config::SearchConfig;

/// Score `pattern` against `text`, or `None` if no window matches.
///
/// Both strings are expected to be normalized keys (ASCII only).
pub fn match_score(pattern: &str, text: &str, config: &SearchConfig) -> Option<f64> {
    if pattern.is_empty() || text.is_empty() {
        return None;
    }
    if pattern == text {
        return Some(0.0);
    }

    let plen = pattern.len();
    let min_len = plen.saturating_sub(1).max(1);
    let max_len = plen + 1;
    let last_start = config.max_offset.min(text.len() - 1);

    let mut best: Option<f64> = None;

    for start in 0..=last_start {
        let proximity = start as f64 / config.location_distance;
        if best.is_some_and(|b| b <= proximity) {
            // Later windows cannot beat this even with zero edits
            break;
        }

        for len in min_len..=max_len {
            let end = (start + len).min(text.len());
            let Some(window) = text.get(start..end) else {
                continue;
            };

            let errors = strsim::levenshtein(pattern, window) as f64 / plen as f64;
            if errors > config.match_threshold {
                continue;
            }

            let score = errors + proximity;
            if score > config.match_threshold {
                continue;
            }

            if best.is_none_or(|b| score < b) {
                best = Some(score);
            }

            if end == text.len() {
                break;
            }
        }
    }

    best
}

/// Score every key and keep the good matches, best first.
///
/// Keeps scores strictly below the cutoff, sorts by score (stable, so
/// equal scores keep key order) and caps the list.
pub fn rank<'k>(
    pattern: &str,
    keys: impl IntoIterator<Item = &'k str>,
    config: &SearchConfig,
) -> Vec<(&'k str, f64)> {
    let mut scored: Vec<(&str, f64)> = keys
        .into_iter()
        .filter_map(|key| match_score(pattern, key, config).map(|score| (key, score)))
        .filter(|(_, score)| *score < config.fuzzy_cutoff)
        .collect();

    scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    scored.truncate(config.max_results);
    scored
}
