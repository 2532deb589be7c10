//! Stream count normalization
//!
//! Counts are whole numbers, so every `.` and `,` is a thousands separator,
//! never a decimal point: `"1.234.567"` and `"1,234,567"` are both 1234567.
//! Underscores are dropped too, so `"1_000"` reads as 1000.

use thiserror::Error;

/// Cell that does not reduce to an integer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a whole number: {raw:?}")]
pub struct NumericParseFailure {
    pub raw: String,
}

/// Strict parse: strip whitespace and `.`/`,`/`_` separators, then parse a
/// signed integer
///
/// Empty residue and `i64` overflow are failures.
pub fn parse_count(raw: &str) -> Result<i64, NumericParseFailure> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(*c, '.' | ',' | '_'))
        .collect();

    cleaned.trim().parse::<i64>().map_err(|_| NumericParseFailure {
        raw: raw.to_string(),
    })
}

/// Lossy parse used for artist rows: anything unparseable becomes 0
pub fn normalize(raw: &str) -> i64 {
    parse_count(raw).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_thousands() {
        assert_eq!(normalize("1.234.567"), 1_234_567);
    }

    #[test]
    fn test_comma_thousands() {
        assert_eq!(normalize("12,000"), 12_000);
    }

    #[test]
    fn test_underscore_grouping() {
        assert_eq!(normalize("1_000"), 1000);
        assert_eq!(parse_count("2_500_000"), Ok(2_500_000));
        assert!(parse_count("_").is_err());
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(normalize(""), 0);
        assert_eq!(normalize("   "), 0);
    }

    #[test]
    fn test_garbage_is_zero() {
        assert_eq!(normalize("abc"), 0);
        assert_eq!(normalize("12 345"), 0);
        assert_eq!(normalize("99999999999999999999"), 0);
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(normalize("  1.500 "), 1500);
    }

    #[test]
    fn test_decimal_looking_values_collapse() {
        // "1.5" is read as a separator, not a fraction
        assert_eq!(normalize("1.5"), 15);
    }

    #[test]
    fn test_signs_pass_through() {
        assert_eq!(normalize("-3"), -3);
        assert_eq!(normalize("+7"), 7);
    }

    #[test]
    fn test_strict_parse_rejects() {
        assert!(parse_count("abc").is_err());
        assert!(parse_count("").is_err());
        assert!(parse_count(".").is_err());
        assert_eq!(parse_count("100"), Ok(100));
    }
}
