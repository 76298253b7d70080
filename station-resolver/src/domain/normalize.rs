//! Station name normalization.
//!
//! Every lookup in the catalog goes through [`normalize`], so user queries
//! and feed names meet on the same key regardless of case, accents,
//! punctuation or doubled letters.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalize a station name into its catalog key.
///
/// Transformations, in order:
/// - lowercase
/// - canonical decomposition (NFD) with combining marks dropped
/// - every character outside `[a-z0-9]` removed
/// - runs of the same character collapsed to one
///
/// Runs are collapsed after stripping so that the result never contains
/// a doubled character, which makes the function idempotent.
///
/// # Examples
///
/// ```
/// use station_resolver::domain::normalize;
///
/// assert_eq!(normalize("Homme de Fer"), "homedefer");
/// assert_eq!(normalize("Université"), "universite");
/// assert_eq!(normalize("Campus d'Illkirch"), "campusdilkirch");
/// ```
pub fn normalize(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut last = None;

    let kept = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect::<Vec<_>>();

    for c in kept {
        if last == Some(c) {
            continue;
        }
        key.push(c);
        last = Some(c);
    }

    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_accents() {
        assert_eq!(normalize("Université"), "universite");
        assert_eq!(normalize("CITÉ ADMINISTRATIVE"), "citeadministrative");
        assert_eq!(normalize("Hôpital Civil"), "hopitalcivil");
    }

    #[test]
    fn strips_punctuation_and_spaces() {
        assert_eq!(normalize("Campus d'Illkirch"), "campusdilkirch");
        assert_eq!(normalize("Baggersee - Parc"), "bagerseparc");
        assert_eq!(normalize("  "), "");
    }

    #[test]
    fn collapses_repeated_characters() {
        assert_eq!(normalize("Homme de Fer"), "homedefer");
        assert_eq!(normalize("Esplanade"), "esplanade");
        assert_eq!(normalize("Illkirch"), "ilkirch");
    }

    #[test]
    fn collapses_repeats_exposed_by_stripping() {
        // "a-a" only becomes a run once the dash is gone
        assert_eq!(normalize("a-a"), "a");
        assert_eq!(normalize("Rue 1 1"), "rue1");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(normalize("Parc des Sports 2"), "parcdesports2");
    }

    #[test]
    fn drops_non_latin_characters() {
        assert_eq!(normalize("Straße"), "strae");
        assert_eq!(normalize("東京"), "");
    }
}
