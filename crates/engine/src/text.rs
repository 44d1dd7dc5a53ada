// ABOUTME: Text helpers shared across the engine: whitespace normalization and number parsing.
// ABOUTME: Also converts parsed numbers into JSON values, keeping whole numbers as integers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

/// First numeric token: optional sign, grouped thousands or a plain digit run, optional decimals.
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?").unwrap());

/// Collapses runs of whitespace into single spaces and trims both ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the first numeric token found anywhere in `input`.
///
/// Thousands separators are dropped before parsing, so `"1,234.50 students"`
/// yields `1234.5`. Returns `None` when the text holds no digits.
pub fn parse_number(input: &str) -> Option<f64> {
    let token = NUMBER_RE.find(input)?;
    let cleaned = token.as_str().replace(',', "");
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Wraps a number as a JSON value, emitting integers when there is no fractional part.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  GPA:   3.5 "), "GPA: 3.5");
        assert_eq!(normalize_whitespace("no\textra\nspaces"), "no extra spaces");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_parse_number_grouped_thousands() {
        assert_eq!(parse_number("1,234.50 students"), Some(1234.5));
        assert_eq!(parse_number("Total: 12,000,000"), Some(12_000_000.0));
    }

    #[test]
    fn test_parse_number_plain_digit_run() {
        assert_eq!(parse_number("12345 applicants"), Some(12345.0));
    }

    #[test]
    fn test_parse_number_sign_and_decimal() {
        assert_eq!(parse_number("change of -3.25 points"), Some(-3.25));
        assert_eq!(parse_number("+7"), Some(7.0));
    }

    #[test]
    fn test_parse_number_none_without_digits() {
        assert_eq!(parse_number("N/A"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_number_value_integer_vs_float() {
        assert_eq!(number_value(97.0), json!(97));
        assert_eq!(number_value(1234.5), json!(1234.5));
        assert_eq!(number_value(-3.0), json!(-3));
    }
}
