// ABOUTME: Compiles an ExtractionConfig into an executable plan of parsed steps and resolved rules.
// ABOUTME: All string-keyed decisions (custom functions, cleanup rules) are made here, once.

//! Compiled extraction plan.
//!
//! Building the plan parses every step, compiles every selector, resolves
//! custom function names and picks the path-driven cleanup rules for each
//! field. Extraction itself then never looks at configuration strings.

use scraper::Selector;

use crate::config::{ExtractionConfig, FieldConfig, FieldType, ScalarType};
use crate::error::ExtractError;
use crate::extractors::collections::{ArrayRule, CleanupRules};
use crate::extractors::compiled::get_or_compile;
use crate::extractors::custom::CustomFunction;
use crate::extractors::steps::{parse_steps, Step};

/// Default element selector for the name/value pair of a flexible object entry.
pub const DEFAULT_PAIR_SELECTOR: &str = "p";

/// One sub-key of a mapped object field.
#[derive(Debug, Clone)]
pub struct MappedKey {
    pub key: String,
    /// `haveText` literals a base element must all contain.
    pub needles: Vec<String>,
    pub get_text: Vec<Step>,
}

impl MappedKey {
    /// Returns true for the full-time/part-time indicator sub-keys.
    pub fn is_time_key(&self) -> bool {
        matches!(self.key.as_str(), "full_time" | "part_time")
    }
}

/// How an object field turns its base elements into a map.
#[derive(Debug, Clone)]
pub enum ObjectPlan {
    Mapped {
        keys: Vec<MappedKey>,
        cleanup: CleanupRules,
    },
    Flexible {
        pair: Selector,
    },
}

/// What a field produces once its candidates are found.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Scalar(ScalarType),
    Array(ArrayRule),
    Object(ObjectPlan),
    Custom(CustomFunction),
    /// A rule that failed to compile under the isolate policy; always yields `null`.
    Broken(String),
}

/// A single field, ready to run.
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub path: String,
    pub find: Vec<Step>,
    pub get_text: Vec<Step>,
    pub kind: FieldKind,
}

impl CompiledField {
    /// Compiles one field rule.
    pub fn compile(path: &str, field: &FieldConfig) -> Result<Self, ExtractError> {
        let find = parse_steps(&field.find).map_err(|e| e.in_field(path))?;
        let get_text = parse_steps(&field.get_text).map_err(|e| e.in_field(path))?;

        let kind = match field.field_type {
            FieldType::Custom => {
                let name = field.custom_function.as_deref().ok_or_else(|| {
                    ExtractError::invalid_config(path, "custom field without customFunction", None)
                })?;
                let function = CustomFunction::resolve(path, name)?;
                if function.needs_find() && find.is_empty() {
                    return Err(ExtractError::invalid_config(path, "missing find steps", None));
                }
                FieldKind::Custom(function)
            }
            FieldType::Array => {
                require_find(path, &find)?;
                FieldKind::Array(ArrayRule::for_path(path))
            }
            FieldType::Object => {
                require_find(path, &find)?;
                FieldKind::Object(compile_object(path, field)?)
            }
            scalar => {
                require_find(path, &find)?;
                // scalar() is only None for Array/Object, handled above
                FieldKind::Scalar(scalar.scalar().unwrap_or(ScalarType::Raw))
            }
        };

        Ok(Self {
            path: path.to_string(),
            find,
            get_text,
            kind,
        })
    }

    /// A placeholder for a field whose rule did not compile.
    pub fn broken(path: &str, err: &ExtractError) -> Self {
        Self {
            path: path.to_string(),
            find: Vec::new(),
            get_text: Vec::new(),
            kind: FieldKind::Broken(err.to_string()),
        }
    }

    /// Short name of the field kind, for logging.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            FieldKind::Scalar(_) => "scalar",
            FieldKind::Array(_) => "array",
            FieldKind::Object(_) => "object",
            FieldKind::Custom(_) => "custom",
            FieldKind::Broken(_) => "broken",
        }
    }
}

fn require_find(path: &str, find: &[Step]) -> Result<(), ExtractError> {
    if find.is_empty() {
        return Err(ExtractError::invalid_config(path, "missing find steps", None));
    }
    Ok(())
}

fn compile_object(path: &str, field: &FieldConfig) -> Result<ObjectPlan, ExtractError> {
    if field.flexible_mapping {
        let css = field
            .pair_selector
            .as_deref()
            .unwrap_or(DEFAULT_PAIR_SELECTOR);
        let pair = get_or_compile(css).ok_or_else(|| {
            ExtractError::invalid_selector(format!("pairSelector:{}", css)).in_field(path)
        })?;
        return Ok(ObjectPlan::Flexible { pair });
    }

    let mapping = field.object_mapping.as_ref().ok_or_else(|| {
        ExtractError::invalid_config(path, "object field without objectMapping", None)
    })?;

    let mut keys = Vec::with_capacity(mapping.len());
    for (key, rule) in mapping {
        let sub_path = format!("{}.{}", path, key);
        let find = parse_steps(&rule.find).map_err(|e| e.in_field(&sub_path))?;
        let get_text = parse_steps(&rule.get_text).map_err(|e| e.in_field(&sub_path))?;
        keys.push(MappedKey {
            key: key.clone(),
            // get steps only matter for selection, which the base elements already did
            needles: find
                .iter()
                .filter_map(|s| s.needle().map(str::to_string))
                .collect(),
            get_text,
        });
    }

    Ok(ObjectPlan::Mapped {
        keys,
        cleanup: CleanupRules::for_path(path),
    })
}

/// The executable form of an [`ExtractionConfig`].
#[derive(Debug, Clone, Default)]
pub struct CompiledConfig {
    fields: Vec<CompiledField>,
}

impl CompiledConfig {
    /// Compiles every field, failing on the first malformed rule.
    pub fn compile(config: &ExtractionConfig) -> Result<Self, ExtractError> {
        let fields = config
            .iter()
            .map(|(path, field)| CompiledField::compile(path, field))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    /// Compiles every field, turning malformed rules into broken fields.
    ///
    /// Returns the plan together with the errors of the fields that did not compile.
    pub fn compile_isolated(config: &ExtractionConfig) -> (Self, Vec<ExtractError>) {
        let mut errors = Vec::new();
        let fields = config
            .iter()
            .map(|(path, field)| match CompiledField::compile(path, field) {
                Ok(compiled) => compiled,
                Err(err) => {
                    let broken = CompiledField::broken(path, &err);
                    errors.push(err);
                    broken
                }
            })
            .collect();
        (Self { fields }, errors)
    }

    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn config(json: &str) -> ExtractionConfig {
        ExtractionConfig::from_json(json).unwrap()
    }

    #[test]
    fn test_compile_kinds() {
        let cfg = config(
            r#"{
            "academics.gpa": {"find": ["get:div.gpa"], "type": "number"},
            "studentLife.greekLife.undergraduate": {"find": ["get:li"], "type": "array"},
            "studentLife.sports.clubSports": {"type": "custom", "customFunction": "extractSportsData"},
            "campusInfo.services": {"find": ["get:li"], "type": "object", "flexibleMapping": true}
        }"#,
        );
        let plan = CompiledConfig::compile(&cfg).unwrap();
        assert_eq!(plan.len(), 4);

        let kinds: Vec<_> = plan.fields().iter().map(|f| (f.path.as_str(), f.kind_name())).collect();
        assert!(kinds.contains(&("academics.gpa", "scalar")));
        assert!(kinds.contains(&("studentLife.greekLife.undergraduate", "array")));
        assert!(kinds.contains(&("studentLife.sports.clubSports", "custom")));
        assert!(kinds.contains(&("campusInfo.services", "object")));
    }

    #[test]
    fn test_mapped_key_keeps_only_have_text_needles() {
        let cfg = config(
            r#"{
            "academics.facultyAndClasses.totalFaculty": {
                "find": ["get:li"],
                "type": "object",
                "objectMapping": {
                    "full_time": {"find": ["get:span", "haveText:Full   time"], "getText": ["get:strong"]}
                }
            }
        }"#,
        );
        let plan = CompiledConfig::compile(&cfg).unwrap();
        let FieldKind::Object(ObjectPlan::Mapped { keys, .. }) = &plan.fields()[0].kind else {
            panic!("expected mapped object");
        };
        assert_eq!(keys[0].needles, vec!["Full time"]);
        assert_eq!(keys[0].get_text.len(), 1);
        assert!(keys[0].is_time_key());
    }

    #[test]
    fn test_malformed_step_names_field_and_step() {
        let cfg = config(r#"{"academics.gpa": {"find": ["div.gpa"], "type": "number"}}"#);
        let err = CompiledConfig::compile(&cfg).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStep);
        assert_eq!(err.field, "academics.gpa");
        assert_eq!(err.op, "div.gpa");
    }

    #[test]
    fn test_unknown_custom_function_fails_fast() {
        let cfg = config(r#"{"a.b": {"type": "custom", "customFunction": "scrapeEverything"}}"#);
        let err = CompiledConfig::compile(&cfg).unwrap_err();
        assert!(err.is_unknown_function());
    }

    #[test]
    fn test_structural_errors() {
        let cfg = config(r#"{"a.b": {"type": "object", "find": ["get:li"]}}"#);
        assert_eq!(
            CompiledConfig::compile(&cfg).unwrap_err().code,
            ErrorCode::InvalidConfig
        );

        let cfg = config(r#"{"a.b": {"type": "number"}}"#);
        assert_eq!(
            CompiledConfig::compile(&cfg).unwrap_err().code,
            ErrorCode::InvalidConfig
        );

        let cfg = config(r#"{"a.b": {"type": "custom"}}"#);
        assert_eq!(
            CompiledConfig::compile(&cfg).unwrap_err().code,
            ErrorCode::InvalidConfig
        );
    }

    #[test]
    fn test_compile_isolated_keeps_good_fields() {
        let cfg = config(
            r#"{
            "a.good": {"find": ["get:h1"]},
            "a.bad": {"find": ["hover:h1"]}
        }"#,
        );
        let (plan, errors) = CompiledConfig::compile_isolated(&cfg);
        assert_eq!(plan.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "a.bad");

        let bad = plan.fields().iter().find(|f| f.path == "a.bad").unwrap();
        assert!(matches!(bad.kind, FieldKind::Broken(_)));
    }
}
