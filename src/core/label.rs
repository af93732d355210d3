//! Hierarchy label classifier.

use regex::Regex;
use std::sync::LazyLock;

/// Values rather than names: optional sign, digits with separators, optional percent.
static NUMERIC_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?\s*[0-9][0-9.,'\s]*\s*%?$").expect("static pattern compiles")
});

const MIN_LABEL_CHARS: usize = 3;

/// Decide whether a cell string is a function name rather than a stray value.
///
/// A label is at least three characters long, contains at least one letter
/// (any script, so `Kühlung` qualifies) and is not a number or percentage.
///
/// ```
/// use fca_toolset::core::is_valid_label;
///
/// assert!(is_valid_label("Sicherheit"));
/// assert!(is_valid_label("H2_1"));
/// assert!(!is_valid_label("42%"));
/// assert!(!is_valid_label("AB"));
/// ```
pub fn is_valid_label(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() || NUMERIC_VALUE.is_match(s) {
        return false;
    }
    if s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("none") {
        return false;
    }
    s.chars().count() >= MIN_LABEL_CHARS && s.chars().any(char::is_alphabetic)
}
