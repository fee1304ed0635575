//! Quote and fence aware field splitting
//!
//! Splits one assembled record into raw field strings. Delimiters only split
//! in plain context: inside a double-quoted field or a triple-backtick fence
//! they are kept verbatim, as is every delimiter past the split cap.

use crate::constants::{FENCE_MARKER, QUOTE_CHAR};

/// Split `text` on `delimiter`, honoring quotes and fences
///
/// `max_splits` bounds the number of splits; `None` splits on every plain
/// delimiter. Fence markers are recognized before quotes at every position,
/// so a marker inside an open quoted field still toggles fence mode.
/// Inside quotes a doubled quote is an escape: both characters are kept and
/// quote mode is not toggled.
pub fn split_fields(text: &str, delimiter: char, max_splits: Option<usize>) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_fence = false;
    let mut splits_done = 0usize;

    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        if rest.starts_with(FENCE_MARKER) {
            current.push_str(FENCE_MARKER);
            in_fence = !in_fence;
            rest = &rest[FENCE_MARKER.len()..];
            continue;
        }

        let mut advance = ch.len_utf8();

        if !in_fence && ch == QUOTE_CHAR {
            if in_quotes && rest[advance..].starts_with(QUOTE_CHAR) {
                // Escaped pair stays raw; the cleaner unescapes it
                current.push(QUOTE_CHAR);
                current.push(QUOTE_CHAR);
                advance += QUOTE_CHAR.len_utf8();
            } else {
                current.push(QUOTE_CHAR);
                in_quotes = !in_quotes;
            }
        } else if ch == delimiter
            && !in_quotes
            && !in_fence
            && max_splits.is_none_or(|max| splits_done < max)
        {
            fields.push(std::mem::take(&mut current));
            splits_done += 1;
        } else {
            current.push(ch);
        }

        rest = &rest[advance..];
    }

    fields.push(current);
    fields
}
