/// Computes `part / total * 100`, rounded to two decimals and clamped to
/// `[0, 100]`. Returns 0.0 when `total` is zero.
pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Returns `true` when `value` looks like a number or an identifier rather
/// than a place name.
///
/// Empty strings, anything that parses as an integer or float, and long digit
/// runs broken up by `-`, `_` or `.` (more than five digits once the
/// separators are gone) all count as numeric.
pub fn is_numeric_like(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }

    if trimmed.parse::<i64>().is_ok() || trimmed.parse::<f64>().is_ok() {
        return true;
    }

    let compact: String = trimmed.chars().filter(|c| *c != ' ').collect();
    let only_digits_and_separators = compact
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | '_' | '.'));
    if !only_digits_and_separators {
        return false;
    }

    let digits = compact.chars().filter(|c| c.is_ascii_digit()).count();
    digits > 5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pct_with_zero_total() {
        assert_eq!(pct(10, 0), 0.0);
    }

    #[test]
    fn test_pct_rounds_to_two_decimals() {
        assert_eq!(pct(4, 10), 40.0);
        assert_eq!(pct(1, 3), 33.33);
        assert_eq!(pct(2, 3), 66.67);
    }

    #[test]
    fn test_pct_is_clamped() {
        assert_eq!(pct(12, 10), 100.0);
        assert_eq!(pct(10, 10), 100.0);
    }

    #[test]
    fn test_numeric_like_plain_numbers() {
        assert!(is_numeric_like(""));
        assert!(is_numeric_like("   "));
        assert!(is_numeric_like("12345"));
        assert!(is_numeric_like("42"));
        assert!(is_numeric_like("3.14"));
        assert!(is_numeric_like(" -7 "));
    }

    #[test]
    fn test_numeric_like_separated_ids() {
        assert!(is_numeric_like("12-34-56"));
        assert!(is_numeric_like("2024_0501 77"));
        // only five digits once separators are stripped
        assert!(!is_numeric_like("12-345"));
        assert!(!is_numeric_like("1_2_3"));
    }

    #[test]
    fn test_numeric_like_place_names() {
        assert!(!is_numeric_like("Warehouse North"));
        assert!(!is_numeric_like("MILANO 2"));
        assert!(!is_numeric_like("A123456"));
    }
}
