//! Head-preserving log truncation
//!
//! Caps are counted in characters so a cut never lands inside a UTF-8
//! sequence. The head of a log is kept because it usually contains the first
//! failing command.

/// Per-step cap applied when logs are fetched
pub const FETCH_LOG_CAP: usize = 10_000;

/// Appended once to any log that exceeded its cap
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Keep the first `cap` characters of `text`, appending [`TRUNCATION_MARKER`]
/// if anything was dropped.
pub fn truncate_log(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + TRUNCATION_MARKER.len());
            out.push_str(&text[..byte_idx]);
            out.push_str(TRUNCATION_MARKER);
            out
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(truncate_log("hello", 10), "hello");
    }

    #[test]
    fn test_exact_cap_unchanged() {
        let text = "x".repeat(10);
        assert_eq!(truncate_log(&text, 10), text);
    }

    #[test]
    fn test_long_text_truncated_with_marker() {
        let text = "y".repeat(25_000);
        let out = truncate_log(&text, FETCH_LOG_CAP);

        assert_eq!(
            out.chars().count(),
            FETCH_LOG_CAP + TRUNCATION_MARKER.chars().count()
        );
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(out.matches(TRUNCATION_MARKER).count(), 1);
    }

    #[test]
    fn test_multibyte_boundary() {
        let text = "é".repeat(5);
        let out = truncate_log(&text, 3);
        assert_eq!(out, format!("ééé{}", TRUNCATION_MARKER));
    }
}
