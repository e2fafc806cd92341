//! Wall-clock helpers.
//!
//! The tracker stamps positions and blends with Unix epoch milliseconds so
//! that every timestamp in a frame can be compared directly.

use chrono::{DateTime, Utc};

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format epoch milliseconds as `HH:MM:SS` UTC, or `"-"` if out of range.
pub fn format_millis(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_millis_is_after_2024() {
        assert!(now_millis() > 1_704_067_200_000);
    }

    #[test]
    fn format_millis_utc() {
        // 2023-11-14T22:13:20Z
        assert_eq!(format_millis(1_700_000_000_000), "22:13:20");
    }

    #[test]
    fn format_millis_out_of_range() {
        assert_eq!(format_millis(i64::MAX), "-");
    }
}
