//! Field cleaning for quoted and fenced columns

use crate::constants::{FENCE_MARKER, QUOTE_CHAR};

/// Strip one pair of outer quotes and unescape doubled quotes
///
/// Values that are not quote-wrapped are returned trimmed but otherwise unchanged.
pub fn unquote_field(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.starts_with(QUOTE_CHAR) && trimmed.ends_with(QUOTE_CHAR) {
        let inner = if trimmed.len() >= 2 * QUOTE_CHAR.len_utf8() {
            &trimmed[QUOTE_CHAR.len_utf8()..trimmed.len() - QUOTE_CHAR.len_utf8()]
        } else {
            ""
        };
        inner.replace("\"\"", "\"")
    } else {
        trimmed.to_string()
    }
}

/// Remove the outer fence markers from a code block
///
/// Single-line code that is not fenced passes through trimmed.
pub fn strip_fence(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.starts_with(FENCE_MARKER) && trimmed.ends_with(FENCE_MARKER) {
        let marker = FENCE_MARKER.len();
        // A lone or overlapping marker leaves nothing inside.
        if trimmed.len() >= 2 * marker {
            trimmed[marker..trimmed.len() - marker].trim().to_string()
        } else {
            String::new()
        }
    } else {
        trimmed.to_string()
    }
}
