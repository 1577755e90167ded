//! Client-side search filtering.
//!
//! Matching is a pure, stateless projection: a record matches when any of
//! its designated text fields contains the case-folded query as a
//! substring. An empty (or whitespace-only) query matches everything, so
//! filtering with it returns the input unchanged.

/// Case-fold and trim a raw query. Returns `None` when the query is empty,
/// which callers treat as "match everything".
pub fn normalize_query(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Case-insensitive substring test. `needle` must already be case-folded
/// (see [`normalize_query`]).
pub fn contains_fold(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
