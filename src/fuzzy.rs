//! Tolerant text matching for loose equality.
//!
//! A needle such as `+1 [willpower]` becomes a case-insensitive regex that
//! requires each word in order, with at most a few arbitrary characters
//! between consecutive words.

use regex::{Regex, RegexBuilder};
use tracing::warn;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Maximum gap between two needle words. Wide enough for
/// "[...] at a skill test [...]".
pub const DEFAULT_TOKEN_DISTANCE: usize = 20;

/// Strips diacritics: decomposes to NFD and drops combining marks.
///
/// ```
/// use buildql::fuzzy::normalize_diacritics;
///
/// assert_eq!(normalize_diacritics("Café Noël"), "Cafe Noel");
/// ```
pub fn normalize_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn prepare(s: &str) -> String {
    normalize_diacritics(s).trim().to_string()
}

/// Builds the matcher for `needle`, or `None` if it has no words.
///
/// ```
/// use buildql::fuzzy::{fuzzy_match, prepare_needle};
///
/// let needle = prepare_needle("fight damage", 20).unwrap();
/// assert!(fuzzy_match(&["Fight. You deal +1 damage."], &needle));
/// assert!(!fuzzy_match(&["Damage before the fight."], &needle));
/// ```
pub fn prepare_needle(needle: &str, token_distance: usize) -> Option<Regex> {
    let prepared = prepare(needle);
    let parts: Vec<String> = prepared.split_whitespace().map(regex::escape).collect();
    if parts.is_empty() {
        return None;
    }

    let pattern = parts.join(&format!(".{{0,{}}}", token_distance));
    match RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .unicode(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(needle, error = %e, "could not compile fuzzy needle");
            None
        }
    }
}

/// True if any haystack entry contains a match for `needle`.
pub fn fuzzy_match<S: AsRef<str>>(haystack: &[S], needle: &Regex) -> bool {
    haystack
        .iter()
        .any(|part| needle.is_match(&prepare(part.as_ref())))
}
