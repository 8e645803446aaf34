use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trims a user-supplied name and rejects empty input.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims optional free text, mapping whitespace-only input to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Case/width-insensitive lookup key for display names.
///
/// NFKC-normalized, lowercased, inner whitespace collapsed to single spaces.
pub(crate) fn normalize_lookup_key(value: &str) -> String {
    value
        .trim()
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
