//! Helpers for `Label: value` lines.

/// Text after the first colon, trimmed. Empty when the line has no colon.
pub fn value_after_colon(line: &str) -> &str {
    line.split_once(':').map(|(_, value)| value.trim()).unwrap_or("")
}

/// Capitalize the first cased letter of every word and lowercase the rest.
///
/// A word starts after any character without case, so apostrophes and digits
/// split words: `john's cafe` becomes `John'S Cafe`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;

    for c in s.chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = c.is_uppercase() || c.is_lowercase();
    }

    out
}
