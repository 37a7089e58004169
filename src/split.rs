//! Multi-value field splitting.
//!
//! The table stores actors and genres as one delimiter-joined string per row
//! (`"Sigourney Weaver; Tom Skerritt"`).

/// Separator used by the table preparation step.
pub const DEFAULT_SEPARATOR: char = ';';

/// Split a delimited field into trimmed, non-empty tokens in source order.
///
/// An absent or blank field yields no tokens.
pub fn split_multi(value: Option<&str>, separator: char) -> Vec<&str> {
    let Some(value) = value else {
        return Vec::new();
    };
    value
        .split(separator)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}
