// ABOUTME: Ranking list normalizer turning "#13 in National Universities (tie)" entries into a keyed map.
// ABOUTME: Keys are camel-cased label slugs; later entries win when two labels slug alike.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

static RANK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#(\d+)").unwrap());
static RANK_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\d+\s+in\s+").unwrap());
static TRAILING_PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^)]*\)\s*$").unwrap());
static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").unwrap());

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "of", "in", "on", "at", "to", "for", "with",
];
const MIN_SLUG_LEN: usize = 2;
const MAX_SLUG_LEN: usize = 50;

/// Splits a ranking entry into its rank and label. Entries without a leading `#<digits>` yield `None`.
pub fn parse_ranking(entry: &str) -> Option<(u64, String)> {
    let entry = entry.trim();
    let rank = RANK_RE.captures(entry)?[1].parse::<u64>().ok()?;
    let label = RANK_PREFIX_RE.replace(entry, "");
    let label = TRAILING_PAREN_RE.replace(&label, "");
    Some((rank, label.trim().to_string()))
}

/// Camel-cases the meaningful words of a label: `"Best Value Schools"` -> `"bestValueSchools"`.
///
/// Every token is lower-cased before joining and only its first letter is
/// upper-cased, so acronyms fold: `"Best MBA Programs"` -> `"bestMbaPrograms"`.
///
/// Single characters, pure numbers and stop words are dropped. Returns `None`
/// when nothing is left or the slug falls outside 2..=50 characters.
pub fn slugify_label(label: &str) -> Option<String> {
    let spaced = NON_WORD_RE.replace_all(label, " ");
    let tokens: Vec<String> = spaced
        .split_whitespace()
        .filter(|t| t.chars().count() > 1)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_lowercase)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect();

    let (first, rest) = tokens.split_first()?;
    let mut slug = first.clone();
    for token in rest {
        let mut chars = token.chars();
        if let Some(head) = chars.next() {
            slug.extend(head.to_uppercase());
            slug.push_str(chars.as_str());
        }
    }

    let len = slug.chars().count();
    (MIN_SLUG_LEN..=MAX_SLUG_LEN).contains(&len).then_some(slug)
}

/// Normalizes ranking entries into a `slug -> rank` map.
pub fn normalize_rankings<S: AsRef<str>>(entries: &[S]) -> Map<String, Value> {
    let mut out = Map::new();
    for entry in entries {
        let entry = entry.as_ref();
        let Some((rank, label)) = parse_ranking(entry) else {
            debug!(entry, "ranking entry without a rank, skipped");
            continue;
        };
        let Some(key) = slugify_label(&label) else {
            debug!(entry, "ranking label produced no usable key, skipped");
            continue;
        };
        out.insert(key, Value::from(rank));
    }
    out
}

/// Rewrites an array-of-strings ranking value into its normalized map.
///
/// Non-string items are ignored. Values that are not arrays (already
/// normalized maps, `null`) are returned unchanged.
pub fn normalize_rankings_value(value: Value) -> Value {
    match value {
        Value::Array(items) => {
            let entries: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            Value::Object(normalize_rankings(&entries))
        }
        other => other,
    }
}
