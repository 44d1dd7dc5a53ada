// ABOUTME: Array and object field processors with the path-driven cleanup rules for malformed source text.
// ABOUTME: Rules are picked once per field from markers in its path (see ArrayRule/CleanupRules::for_path).

//! List- and map-shaped field processing.
//!
//! Profile pages render labelled values as concatenated text such as
//! `"Independent100%"`, `"Male60.7%"` or `"First-year StudentsYes"`. Which
//! cleanup applies depends on the field, identified by marker substrings in
//! its path. Every cleanup is idempotent: running it on its own output is a
//! no-op.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

use crate::extractors::fields::resolve_text;
use crate::extractors::plan::MappedKey;
use crate::extractors::steps::{contains_text, Step};
use crate::text::{normalize_whitespace, number_value, parse_number};

/// Field-path markers that select a cleanup rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    GreekLife,
    Undergraduate,
    SpecialStudyOptions,
    SpecialAcademicPrograms,
    FacultyAndClasses,
    TotalFaculty,
    GenderDistribution,
    EthnicDiversity,
    ClassSizes,
    StudentDemographics,
    RequiredHousing,
}

const MARKERS: &[(Marker, &str)] = &[
    (Marker::GreekLife, "greekLife"),
    (Marker::Undergraduate, "undergraduate"),
    (
        Marker::SpecialStudyOptions,
        "studentParticipationInSpecialStudyOptions",
    ),
    (
        Marker::SpecialAcademicPrograms,
        "studentParticipationInSpecialAcademicPrograms",
    ),
    (Marker::FacultyAndClasses, "facultyAndClasses"),
    (Marker::TotalFaculty, "totalFaculty"),
    (Marker::GenderDistribution, "GenderDistribution"),
    (Marker::EthnicDiversity, "EthnicDiversity"),
    (Marker::ClassSizes, "classSizes"),
    (Marker::StudentDemographics, "studentDemographics"),
    (Marker::RequiredHousing, "studentsRequiredToLiveInSchoolHousing"),
];

static MARKER_MATCHER: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(MARKERS.iter().map(|(_, pat)| *pat)).unwrap());

static COMBINED_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z\s]+)(\d+%)$").unwrap());
static PERCENT_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+%$").unwrap());
static TIME_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(full time|part time)$").unwrap());
static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?%").unwrap());
static TRAILING_YES_NO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(Yes|No)$").unwrap());
static NON_ALNUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

const MAX_KEY_LEN: usize = 50;

/// Markers present in one field path.
struct PathMarkers(Vec<Marker>);

impl PathMarkers {
    fn scan(path: &str) -> Self {
        Self(
            MARKER_MATCHER
                .find_overlapping_iter(path)
                .map(|m| MARKERS[m.pattern().as_usize()].0)
                .collect(),
        )
    }

    fn has(&self, marker: Marker) -> bool {
        self.0.contains(&marker)
    }

    fn any(&self, markers: &[Marker]) -> bool {
        markers.iter().any(|m| self.has(*m))
    }
}

/// Post-pass applied to a collected array field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayRule {
    #[default]
    Plain,
    /// Split `"Independent100%"` into `"Independent"`, `"100%"`.
    SplitCombinedLabel,
    /// Drop entries that are only a percentage.
    DropPercentOnly,
}

impl ArrayRule {
    pub fn for_path(path: &str) -> Self {
        let markers = PathMarkers::scan(path);
        if markers.has(Marker::GreekLife) && markers.has(Marker::Undergraduate) {
            ArrayRule::SplitCombinedLabel
        } else if markers.any(&[Marker::SpecialStudyOptions, Marker::SpecialAcademicPrograms]) {
            ArrayRule::DropPercentOnly
        } else {
            ArrayRule::Plain
        }
    }

    /// Applies the rule to already-normalized entries.
    pub fn apply(self, entries: Vec<String>) -> Vec<String> {
        match self {
            ArrayRule::Plain => entries,
            ArrayRule::SplitCombinedLabel => {
                let mut out = Vec::with_capacity(entries.len());
                for entry in entries {
                    match COMBINED_LABEL_RE.captures(&entry) {
                        Some(caps) => {
                            out.push(caps[1].trim().to_string());
                            out.push(caps[2].to_string());
                        }
                        None => out.push(entry),
                    }
                }
                out
            }
            ArrayRule::DropPercentOnly => entries
                .into_iter()
                .filter(|e| !PERCENT_ONLY_RE.is_match(e.trim()))
                .collect(),
        }
    }
}

/// Collects the normalized, non-empty text of every candidate in document order.
pub fn collect_array<'a>(
    doc: &'a Html,
    candidates: &[ElementRef<'a>],
    get_text: &[Step],
    rule: ArrayRule,
) -> Vec<String> {
    let entries = candidates
        .iter()
        .map(|el| normalize_whitespace(&resolve_text(doc, *el, get_text)))
        .filter(|text| !text.is_empty())
        .collect();
    rule.apply(entries)
}

/// How a resolved object value is reduced after whitespace normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueRule {
    #[default]
    Plain,
    /// Keep the first percentage (`"Male60.7%"` -> `"60.7%"`).
    Percentage,
    /// Keep a trailing `Yes`/`No` (`"First-year StudentsYes"` -> `"Yes"`).
    YesNo,
}

/// Cleanup applied to every sub-value of a mapped object field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupRules {
    /// Strip a trailing "full time"/"part time" label from time sub-keys.
    pub strip_time_label: bool,
    /// Parse time sub-keys as numbers when possible.
    pub numeric_counts: bool,
    pub value: ValueRule,
}

impl CleanupRules {
    pub fn for_path(path: &str) -> Self {
        let markers = PathMarkers::scan(path);
        let value = if markers.any(&[
            Marker::GenderDistribution,
            Marker::EthnicDiversity,
            Marker::ClassSizes,
            Marker::StudentDemographics,
            Marker::GreekLife,
        ]) {
            ValueRule::Percentage
        } else if markers.has(Marker::RequiredHousing) {
            ValueRule::YesNo
        } else {
            ValueRule::Plain
        };
        Self {
            strip_time_label: markers.has(Marker::FacultyAndClasses),
            numeric_counts: markers.has(Marker::TotalFaculty),
            value,
        }
    }

    /// Cleans one resolved sub-value.
    pub fn clean(&self, text: &str, time_key: bool) -> Value {
        let mut cleaned = normalize_whitespace(text);
        if self.strip_time_label && time_key {
            cleaned = TIME_LABEL_RE.replace(&cleaned, "").into_owned();
        }
        if self.numeric_counts && time_key {
            return match parse_number(&cleaned) {
                Some(n) => number_value(n),
                None => Value::String(cleaned),
            };
        }
        let reduced = match self.value {
            ValueRule::Plain => None,
            ValueRule::Percentage => PERCENT_RE.find(&cleaned).map(|m| m.as_str().to_string()),
            ValueRule::YesNo => TRAILING_YES_NO_RE
                .captures(&cleaned)
                .map(|caps| caps[1].to_string()),
        };
        Value::String(reduced.unwrap_or(cleaned))
    }
}

/// Builds an object from predefined sub-key rules.
///
/// Each sub-key takes the first base element containing all of its
/// `haveText` needles. Sub-keys without a match or with empty text are omitted.
pub fn build_mapped_object<'a>(
    doc: &'a Html,
    base: &[ElementRef<'a>],
    keys: &[MappedKey],
    cleanup: &CleanupRules,
) -> Map<String, Value> {
    let mut obj = Map::new();
    for mapped in keys {
        let Some(target) = base
            .iter()
            .find(|el| mapped.needles.iter().all(|n| contains_text(**el, n)))
        else {
            continue;
        };
        let text = resolve_text(doc, *target, &mapped.get_text);
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        obj.insert(mapped.key.clone(), cleanup.clean(text, mapped.is_time_key()));
    }
    obj
}

/// Builds an object from name/value pairs found inside each base element.
///
/// The first match of `pair` is the name and the last is the value. A base
/// element with fewer than two matches has no separate name and value and is
/// skipped, so a lone `<p>` never becomes a key mapped to its own text. Later
/// elements overwrite earlier ones when their names slug to the same key.
pub fn build_flexible_object(base: &[ElementRef<'_>], pair: &Selector) -> Map<String, Value> {
    let mut obj = Map::new();
    for el in base {
        let parts: Vec<ElementRef<'_>> = el.select(pair).collect();
        if parts.len() < 2 {
            continue;
        }
        let name = parts[0].text().collect::<String>();
        let value = parts[parts.len() - 1].text().collect::<String>();
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            continue;
        }
        let key = slug_key(name);
        if key.is_empty() {
            continue;
        }
        obj.insert(key, Value::String(value.to_string()));
    }
    obj
}

/// Derives an object key from a free-text label.
///
/// Lower-cases, drops everything but ASCII letters, digits and whitespace,
/// removes the whitespace and truncates to 50 characters.
pub fn slug_key(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_ALNUM_RE
        .replace_all(&lowered, "")
        .split_whitespace()
        .collect::<String>()
        .chars()
        .take(MAX_KEY_LEN)
        .collect()
}
