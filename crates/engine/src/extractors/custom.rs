// ABOUTME: Registry of named custom extraction strategies for fields of type "custom".
// ABOUTME: Names resolve to a closed enum when the engine is built; unknown names fail fast.

//! Custom extraction strategies.
//!
//! Fields of type `custom` bypass the generic find/cast pipeline. The
//! `customFunction` name is resolved once into a [`CustomFunction`]:
//! - `extractSportsData`: one category of the shared sports section, picked by
//!   the field path's suffix.
//! - `extractSatScores`: the field's find/getText text run through the
//!   SAT-scale parser.

use serde_json::Value;
use tracing::warn;

use crate::engine::DocumentContext;
use crate::error::ExtractError;
use crate::extractors::cast::parse_sat_scale;
use crate::extractors::fields::extract_field_text;
use crate::extractors::plan::CompiledField;
use crate::extractors::sports::SportsCategory;

pub const SPORTS_DATA: &str = "extractSportsData";
pub const SAT_SCORES: &str = "extractSatScores";

/// A resolved custom strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomFunction {
    /// One category of the document's sports section.
    Sports(SportsCategory),
    /// SAT score-range distribution.
    SatScale,
    /// A known strategy the field path gives it nothing to do for; yields `null`.
    Unhandled,
}

impl CustomFunction {
    /// Resolves a `customFunction` name for the field at `path`.
    pub fn resolve(path: &str, name: &str) -> Result<Self, ExtractError> {
        match name {
            SPORTS_DATA => Ok(match SportsCategory::from_path(path) {
                Some(category) => CustomFunction::Sports(category),
                None => {
                    warn!(field = path, "sports field path has no known category suffix");
                    CustomFunction::Unhandled
                }
            }),
            SAT_SCORES => Ok(CustomFunction::SatScale),
            other => Err(ExtractError::unknown_function(path, other)),
        }
    }

    /// Returns true if the strategy reads the field's own find steps.
    pub fn needs_find(self) -> bool {
        matches!(self, CustomFunction::SatScale)
    }

    /// Runs the strategy for one field of one document.
    pub fn run(self, ctx: &DocumentContext<'_>, field: &CompiledField) -> Value {
        match self {
            CustomFunction::Sports(category) => ctx.sports().value_for(category),
            CustomFunction::SatScale => {
                extract_field_text(ctx.doc(), &field.find, &field.get_text)
                    .and_then(|text| parse_sat_scale(&text))
                    .map(Value::Object)
                    .unwrap_or(Value::Null)
            }
            CustomFunction::Unhandled => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sports_by_suffix() {
        assert_eq!(
            CustomFunction::resolve("studentLife.sports.clubSports", SPORTS_DATA).unwrap(),
            CustomFunction::Sports(SportsCategory::Club)
        );
        assert_eq!(
            CustomFunction::resolve("studentLife.sports.nonscholarshipSports", SPORTS_DATA).unwrap(),
            CustomFunction::Sports(SportsCategory::NonScholarship)
        );
        assert_eq!(
            CustomFunction::resolve("studentLife.sports.summary", SPORTS_DATA).unwrap(),
            CustomFunction::Unhandled
        );
    }

    #[test]
    fn test_resolve_sat_scores() {
        let f = CustomFunction::resolve("applying.satScores", SAT_SCORES).unwrap();
        assert_eq!(f, CustomFunction::SatScale);
        assert!(f.needs_find());
    }

    #[test]
    fn test_resolve_unknown_name() {
        let err = CustomFunction::resolve("applying.x", "extractEverything").unwrap_err();
        assert!(err.is_unknown_function());
        assert_eq!(err.field, "applying.x");
        assert_eq!(err.op, "extractEverything");
    }
}
