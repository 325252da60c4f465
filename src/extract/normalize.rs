//! Value normalization for extracted product fields

use super::NOT_AVAILABLE;

/// Extracts the percentage from a rating bar style such as `"width:80%"`
///
/// Takes the segment after the first `:` and trims it. A missing attribute or
/// a style without `:` yields the sentinel.
pub fn normalize_rating_score(style: Option<&str>) -> String {
    style
        .and_then(|s| s.split(':').nth(1))
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Strips parenthesis characters from a review count such as `"(1.234)"`
///
/// Surrounding whitespace is trimmed before the parentheses are removed, so
/// whitespace inside them survives (`"( 9 )"` gives `" 9 "`). An input that is
/// empty after stripping is returned as-is (empty).
pub fn normalize_rating_count(raw: &str) -> String {
    raw.trim().chars().filter(|c| *c != '(' && *c != ')').collect()
}

/// Joins promotion names with `", "`, or the sentinel when there are none
pub fn join_promotions(names: &[String]) -> String {
    if names.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        names.join(", ")
    }
}
