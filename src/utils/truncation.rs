//! Decimal truncation used for reported seconds and percentages.

/// Truncate (not round) `value` to `places` decimal places
///
/// `truncate_to_place(1.23456, 2) == 1.23`, `truncate_to_place(-1.239, 2) == -1.23`
pub fn truncate_to_place(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).trunc() / scale
}

/// Microseconds to seconds, truncated to `places`
pub fn micros_to_seconds(micros: i64, places: u32) -> f64 {
    truncate_to_place(micros as f64 / 1_000_000.0, places)
}

/// Microseconds to whole milliseconds, truncated toward zero
pub fn micros_to_millis(micros: i64) -> i64 {
    micros / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_place() {
        assert_eq!(truncate_to_place(1.23456, 2), 1.23);
        assert_eq!(truncate_to_place(1.23456, 4), 1.2345);
        assert_eq!(truncate_to_place(-1.239, 2), -1.23);
        assert_eq!(truncate_to_place(7.0, 2), 7.0);
    }

    #[test]
    fn test_micros_conversions() {
        assert_eq!(micros_to_seconds(1_234_567, 2), 1.23);
        assert_eq!(micros_to_millis(1_999), 1);
        assert_eq!(micros_to_millis(300_000), 300);
    }
}
