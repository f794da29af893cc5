use once_cell::sync::Lazy;
use regex::Regex;

static DASH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-+$")
        .expect("Invalid dash regex")
});

/// True when `text` is a run of dashes, the plan's marker for "no value".
///
/// Blank text is not a sentinel.
pub fn is_dash_sentinel(text: &str) -> bool {
    DASH_REGEX.is_match(text.trim())
}

/// Maps a sentinel cell to `None` and anything else to its text.
pub fn normalize_cell(text: &str) -> Option<String> {
    if is_dash_sentinel(text) {
        None
    } else {
        Some(text.to_string())
    }
}
