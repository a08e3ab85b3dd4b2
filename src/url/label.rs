//! Link label normalization
//!
//! Labels come from anchor text and image alt attributes and may be used
//! as filenames, so they are cleaned up before the downloader sees them.

/// Characters that are not safe in a filename on common filesystems
const UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Normalizes a link label into a bounded, filesystem-safe string
///
/// - control characters are dropped
/// - filesystem-unsafe characters become `_`
/// - whitespace runs collapse to a single space, leading/trailing trimmed
/// - the result is truncated to at most `max_len` characters, never
///   erroring on overlong input
pub fn normalize_label(label: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(label.len().min(max_len));
    let mut pending_space = false;

    for c in label.chars() {
        if c.is_control() {
            continue;
        }
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if UNSAFE_CHARS.contains(&c) {
            out.push('_');
        } else {
            out.push(c);
        }
    }

    if out.chars().count() > max_len {
        out = out.chars().take(max_len).collect();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_label_unchanged() {
        assert_eq!(normalize_label("holiday photo", 100), "holiday photo");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize_label("  a \t b\n c  ", 100), "a b c");
    }

    #[test]
    fn test_unsafe_chars_replaced() {
        assert_eq!(normalize_label("a/b\\c:d", 100), "a_b_c_d");
        assert_eq!(normalize_label("what?*", 100), "what__");
    }

    #[test]
    fn test_control_chars_dropped() {
        assert_eq!(normalize_label("a\u{0}b\u{7}c", 100), "abc");
    }

    #[test]
    fn test_truncation() {
        let long = "x".repeat(500);
        assert_eq!(normalize_label(&long, 100).len(), 100);
    }

    #[test]
    fn test_truncation_multibyte_safe() {
        let long = "é".repeat(500);
        let out = normalize_label(&long, 100);
        assert_eq!(out.chars().count(), 100);
    }

    #[test]
    fn test_empty_label() {
        assert_eq!(normalize_label("", 100), "");
        assert_eq!(normalize_label("   ", 100), "");
    }
}
