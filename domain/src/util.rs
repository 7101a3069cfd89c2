//! Shared utility functions.

/// Marker appended to message bodies cut short by [`truncate_marked`].
pub const TRUNCATION_MARKER: &str = " [truncated]";

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
///
/// Returns a sub-slice of the original string. If the string is shorter than
/// `max_bytes`, the entire string is returned unchanged.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Truncate a string to `max_bytes`, appending an explicit marker when the
/// body was actually cut (UTF-8 safe).
///
/// The marker is appended *after* cutting, so the result may slightly exceed
/// `max_bytes` by the marker length. Callers that need a hard budget should
/// account for [`TRUNCATION_MARKER`] themselves.
pub fn truncate_marked(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    format!("{}{}", truncate_str(s, max_bytes), TRUNCATION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn truncate_no_op_when_short() {
        assert_eq!(truncate_str("hi", 10), "hi");
    }

    #[test]
    fn truncate_multibyte_boundary() {
        // 'の' is 3 bytes (U+306E): bytes 0xe3 0x81 0xae
        let s = "あのね"; // 9 bytes: 3+3+3
        // Cutting at byte 4 would land inside 'の', should back up to 3
        assert_eq!(truncate_str(s, 4), "あ");
        assert_eq!(truncate_str(s, 6), "あの");
    }

    #[test]
    fn truncate_marked_appends_marker_only_when_cut() {
        assert_eq!(truncate_marked("short", 10), "short");
        assert_eq!(
            truncate_marked("hello world", 5),
            format!("hello{}", TRUNCATION_MARKER)
        );
    }

    #[test]
    fn truncate_empty() {
        assert_eq!(truncate_str("", 10), "");
        assert_eq!(truncate_marked("", 10), "");
    }
}
