//! Filtering for patterns from the environment channel.
//!
//! The durable file store is explicitly curated by the user, so its contents
//! are trusted as-is. Patterns arriving through the environment are a
//! convenience surface that must not be able to grant blanket approval, so
//! catastrophically broad expressions are stripped before use. The
//! session-level override that deliberately disables all checks is a
//! separate, explicit code path and is never filtered.

/// Expressions that match any command and would defeat authorization
/// entirely. Removal is by exact string match only - near-misses like
/// `^.*$suffix` stay.
const DANGEROUS_PATTERNS: &[&str] = &[
    ".*",
    "^.*$",
    ".+",
    "^.+$",
    r"[\s\S]*",
    r"^[\s\S]*$",
    r"[\s\S]+",
    r"^[\s\S]+$",
];

/// Remove match-everything patterns from an environment-sourced list.
///
/// ```rust
/// use riff_core::authorize::filter_dangerous_patterns;
///
/// let patterns = vec![
///     ".*".to_string(),
///     "^git.*".to_string(),
///     ".+".to_string(),
///     "^npm.*".to_string(),
/// ];
/// assert_eq!(
///     filter_dangerous_patterns(patterns),
///     vec!["^git.*", "^npm.*"]
/// );
/// ```
pub fn filter_dangerous_patterns(patterns: Vec<String>) -> Vec<String> {
    patterns
        .into_iter()
        .filter(|p| !DANGEROUS_PATTERNS.contains(&p.as_str()))
        .collect()
}

/// Decode the environment override value: a JSON array of pattern strings.
///
/// Parsed permissively - anything that is not a JSON string array yields
/// zero patterns rather than an error, so a malformed value never blocks
/// the file-based patterns it merges with.
pub fn parse_extra_patterns(raw: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_default()
}
