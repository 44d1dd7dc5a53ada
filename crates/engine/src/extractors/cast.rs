// ABOUTME: Value caster turning resolved text into typed JSON scalars, plus the SAT-scale parser.
// ABOUTME: Cast failures resolve to null; nothing here returns an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::config::ScalarType;
use crate::text::{normalize_whitespace, number_value, parse_number};

const TRUE_WORDS: &[&str] = &["true", "yes", "y", "1", "on"];
const FALSE_WORDS: &[&str] = &["false", "no", "n", "0", "off"];

static SAT_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*SATs?\s+on\s+\d+\s+scale").unwrap());

/// A 3-4 digit score range immediately followed by a percentage.
static SAT_PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{3,4}-\d{3,4})(\d+(?:\.\d+)?)%").unwrap());

/// Casts resolved text to a scalar. `None` text always casts to `null`.
pub fn cast(text: Option<&str>, ty: ScalarType) -> Value {
    let Some(text) = text else {
        return Value::Null;
    };
    match ty {
        ScalarType::Number => parse_number(&normalize_whitespace(text))
            .map(number_value)
            .unwrap_or(Value::Null),
        ScalarType::Boolean => {
            let lowered = normalize_whitespace(text).to_lowercase();
            if TRUE_WORDS.contains(&lowered.as_str()) {
                Value::Bool(true)
            } else if FALSE_WORDS.contains(&lowered.as_str()) {
                Value::Bool(false)
            } else {
                Value::Null
            }
        }
        ScalarType::String => Value::String(normalize_whitespace(text)),
        ScalarType::Raw => Value::String(text.to_string()),
    }
}

/// Parses an SAT score distribution such as `"SATs on 1600 scale1400-160097%1200-139992%"`.
///
/// Returns a map from score range to percentage, or `None` when no range/percentage
/// pair is present.
pub fn parse_sat_scale(text: &str) -> Option<Map<String, Value>> {
    let normalized = normalize_whitespace(text);
    let body = SAT_PREFIX_RE.replace(&normalized, "");

    let mut scores = Map::new();
    for caps in SAT_PAIR_RE.captures_iter(&body) {
        let Some(pct) = caps[2].parse::<f64>().ok() else {
            continue;
        };
        scores.insert(caps[1].to_string(), number_value(pct));
    }

    if scores.is_empty() {
        None
    } else {
        Some(scores)
    }
}
