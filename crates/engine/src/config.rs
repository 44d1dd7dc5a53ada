// ABOUTME: Declarative field configuration: FieldConfig, MappingRule, ExtractionConfig and their JSON form.
// ABOUTME: Also maps saved page snapshots to the field-path prefix their fields live under.

//! Field configuration as read from JSON.
//!
//! An [`ExtractionConfig`] maps dot-structured field paths such as
//! `"studentLife.greekLife.undergraduate"` to a [`FieldConfig`]. The first
//! path segment names the page the field is read from. These types are the
//! raw, uncompiled form; [`crate::extractors::plan`] turns them into an
//! executable plan when an engine is built.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// The declared output shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    #[default]
    String,
    Boolean,
    Raw,
    Array,
    Object,
    Custom,
}

/// The scalar types a single value can be cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Number,
    String,
    Boolean,
    Raw,
}

impl FieldType {
    /// Returns the scalar cast for this field type, or `None` for array/object.
    pub fn scalar(self) -> Option<ScalarType> {
        match self {
            FieldType::Number => Some(ScalarType::Number),
            FieldType::String => Some(ScalarType::String),
            FieldType::Boolean => Some(ScalarType::Boolean),
            FieldType::Raw | FieldType::Custom => Some(ScalarType::Raw),
            FieldType::Array | FieldType::Object => None,
        }
    }
}

/// A nested rule resolving one sub-key of an object field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRule {
    #[serde(default)]
    pub find: Vec<String>,
    #[serde(default)]
    pub get_text: Vec<String>,
    /// Expected type of the resolved value; only consulted by validation.
    #[serde(default, rename = "type")]
    pub value_type: Option<FieldType>,
}

/// Configuration for producing one output field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Steps locating candidate elements from the document root
    #[serde(default)]
    pub find: Vec<String>,
    /// Steps applied inside a matched element to find the value element
    #[serde(default)]
    pub get_text: Vec<String>,
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub object_mapping: Option<BTreeMap<String, MappingRule>>,
    /// Derive object keys from name/value pairs instead of `object_mapping`
    #[serde(default)]
    pub flexible_mapping: bool,
    #[serde(default)]
    pub custom_function: Option<String>,
    /// Expected type of array items; only consulted by validation.
    #[serde(default)]
    pub get_item_type: Option<ScalarType>,
    /// Selector for the name/value elements of a flexible mapping (defaults to `p`)
    #[serde(default)]
    pub pair_selector: Option<String>,
}

/// Mapping from field path to field configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionConfig {
    fields: BTreeMap<String, FieldConfig>,
}

impl ExtractionConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        serde_json::from_str(json).map_err(|e| {
            ExtractError::invalid_config("", "parse config", Some(anyhow::Error::new(e)))
        })
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            ExtractError::io(
                path.display().to_string(),
                "read config",
                Some(anyhow::Error::new(e)),
            )
        })?;
        Self::from_json(&json).map_err(|e| e.in_field(path.display().to_string()))
    }

    /// Adds or replaces a field rule.
    pub fn insert(&mut self, path: impl Into<String>, field: FieldConfig) {
        self.fields.insert(path.into(), field);
    }

    /// Looks up a field rule by its path.
    pub fn get(&self, path: &str) -> Option<&FieldConfig> {
        self.fields.get(path)
    }

    /// Iterates field rules in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldConfig)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the subset of fields whose path starts with `prefix` followed by a dot.
    pub fn for_page(&self, prefix: &str) -> ExtractionConfig {
        let dotted = format!("{}.", prefix);
        self.fields
            .iter()
            .filter(|(path, _)| path.starts_with(&dotted))
            .map(|(path, field)| (path.clone(), field.clone()))
            .collect()
    }
}

impl FromIterator<(String, FieldConfig)> for ExtractionConfig {
    fn from_iter<I: IntoIterator<Item = (String, FieldConfig)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Maps a saved page snapshot to the path prefix of the fields read from it.
///
/// `student_life.html` becomes `studentLife`; unknown names map to their file stem.
pub fn page_prefix_for_file(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.as_str() {
        "overall_rankings" => "overallRankings".to_string(),
        "campus_info" => "campusInfo".to_string(),
        "student_life" => "studentLife".to_string(),
        _ => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JSON: &str = r#"{
        "academics.gpa": { "find": ["get:div.gpa"], "type": "number" },
        "academics.facultyAndClasses.totalFaculty": {
            "find": ["get:li"],
            "type": "object",
            "objectMapping": {
                "full_time": { "find": ["haveText:full time"], "getText": ["get:span"], "type": "number" }
            }
        },
        "studentLife.sports.clubSports": { "type": "custom", "customFunction": "extractSportsData" },
        "studentLife.greekLife.undergraduate": { "find": ["get:li"], "type": "array", "getItemType": "string" }
    }"#;

    #[test]
    fn test_parse_config_json() {
        let cfg = ExtractionConfig::from_json(SAMPLE_JSON).expect("parse");
        assert_eq!(cfg.len(), 4);

        let gpa = cfg.get("academics.gpa").unwrap();
        assert_eq!(gpa.field_type, FieldType::Number);
        assert_eq!(gpa.find, vec!["get:div.gpa"]);
        assert!(gpa.get_text.is_empty());

        let faculty = cfg.get("academics.facultyAndClasses.totalFaculty").unwrap();
        let mapping = faculty.object_mapping.as_ref().unwrap();
        let full_time = &mapping["full_time"];
        assert_eq!(full_time.get_text, vec!["get:span"]);
        assert_eq!(full_time.value_type, Some(FieldType::Number));

        let sports = cfg.get("studentLife.sports.clubSports").unwrap();
        assert_eq!(sports.custom_function.as_deref(), Some("extractSportsData"));
        assert!(sports.find.is_empty());

        let greek = cfg.get("studentLife.greekLife.undergraduate").unwrap();
        assert_eq!(greek.get_item_type, Some(ScalarType::String));
    }

    #[test]
    fn test_type_defaults_to_string() {
        let cfg = ExtractionConfig::from_json(r#"{"a.b": {"find": ["get:h1"]}}"#).unwrap();
        assert_eq!(cfg.get("a.b").unwrap().field_type, FieldType::String);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = ExtractionConfig::from_json(r#"{"a.b": {"type": "tuple"}}"#).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_for_page_filters_by_prefix() {
        let cfg = ExtractionConfig::from_json(SAMPLE_JSON).unwrap();
        let academics = cfg.for_page("academics");
        assert_eq!(academics.len(), 2);
        assert!(academics.get("academics.gpa").is_some());
        assert!(academics.get("studentLife.sports.clubSports").is_none());

        // "academic" must not match "academics.*"
        assert!(cfg.for_page("academic").is_empty());
    }

    #[test]
    fn test_page_prefix_for_file() {
        assert_eq!(
            page_prefix_for_file(Path::new("data/x/student_life.html")),
            "studentLife"
        );
        assert_eq!(
            page_prefix_for_file(Path::new("overall_rankings.html")),
            "overallRankings"
        );
        assert_eq!(page_prefix_for_file(Path::new("academics.html")), "academics");
        assert_eq!(page_prefix_for_file(Path::new("other_page.html")), "other_page");
    }
}
