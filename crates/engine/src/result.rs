// ABOUTME: ExtractionResult: the flat field-path -> value map produced for one document.
// ABOUTME: Includes merging of per-page results and the in-place ranking normalization pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rankings::normalize_rankings_value;

/// The values extracted from one document, keyed by field path.
///
/// Every configured field has exactly one entry; missing data is `Value::Null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    fields: BTreeMap<String, Value>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: Value) {
        self.fields.insert(path.into(), value);
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if the field is present and not `null`.
    pub fn has_value(&self, path: &str) -> bool {
        self.fields.get(path).is_some_and(|v| !v.is_null())
    }

    /// Merges another result into this one; `other` wins on key collision.
    pub fn merge(&mut self, other: ExtractionResult) {
        self.fields.extend(other.fields);
    }

    /// Replaces the array at `path` with its normalized ranking map.
    ///
    /// Missing fields and non-array values are left untouched, so running the
    /// pass twice is a no-op.
    pub fn process_rankings(mut self, path: &str) -> Self {
        if let Some(value) = self.fields.remove(path) {
            self.fields
                .insert(path.to_string(), normalize_rankings_value(value));
        }
        self
    }

    /// Converts the result into a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.fields
    }
}

impl FromIterator<(String, Value)> for ExtractionResult {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_later_wins() {
        let mut a: ExtractionResult = [
            ("academics.gpa".to_string(), json!(3.5)),
            ("applying.deadline".to_string(), Value::Null),
        ]
        .into_iter()
        .collect();
        let b: ExtractionResult = [("applying.deadline".to_string(), json!("Jan 1"))]
            .into_iter()
            .collect();
        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("applying.deadline"), Some(&json!("Jan 1")));
    }

    #[test]
    fn test_process_rankings_in_place() {
        let mut result = ExtractionResult::new();
        result.insert(
            "overallRankings.rankings",
            json!(["#13 in National Universities (tie)", "no rank here"]),
        );
        result.insert("overallRankings.other", json!(["#1 in Something"]));

        let result = result.process_rankings("overallRankings.rankings");
        assert_eq!(
            result.get("overallRankings.rankings"),
            Some(&json!({"nationalUniversities": 13}))
        );
        // Other fields are not touched
        assert_eq!(result.get("overallRankings.other"), Some(&json!(["#1 in Something"])));

        let again = result.clone().process_rankings("overallRankings.rankings");
        assert_eq!(again, result);
    }

    #[test]
    fn test_process_rankings_missing_field() {
        let result = ExtractionResult::new().process_rankings("overallRankings.rankings");
        assert!(result.is_empty());
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut result = ExtractionResult::new();
        result.insert("a.b", json!(1));
        result.insert("a.c", Value::Null);
        assert!(result.has_value("a.b"));
        assert!(!result.has_value("a.c"));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"a.b": 1, "a.c": null})
        );
        assert_eq!(result.to_json(), json!({"a.b": 1, "a.c": null}));
    }
}
