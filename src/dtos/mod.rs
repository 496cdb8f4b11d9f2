pub mod buyer;
pub mod common;
pub mod draft;
pub mod line;
pub mod offer;

/// Trimmed text, or `None` when absent or blank.
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
