//! Cleanup shared by the services that return free text.

/// Strips one pair of wrapping double quotes, then surrounding whitespace.
///
/// Leading and trailing whitespace is ignored when looking for the quotes.
/// At most one leading and one trailing `"` (U+0022) are removed, and only
/// when both are present; inner quotes are kept.
pub fn strip_wrapping_quotes(text: &str) -> String {
    let trimmed = text.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}
