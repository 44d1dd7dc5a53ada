// ABOUTME: Step interpreter: parses "action:argument" steps and narrows a candidate element set.
// ABOUTME: `get`/`find` expand to matching descendants, `haveText` filters by normalized text.

//! Step-based element location.
//!
//! A step sequence is evaluated left to right against a scope. The candidate
//! set is an ordered `Vec` rather than a set: a `get` step does not
//! deduplicate elements reached from more than one parent candidate.
//!
//! Key behaviors:
//! - An empty starting scope means "the whole document".
//! - As soon as a step leaves no candidates the remaining steps are skipped.
//! - Action names are case-insensitive; arguments are matched case-sensitively.

use std::fmt;
use std::str::FromStr;

use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;
use crate::extractors::compiled::get_or_compile;
use crate::text::normalize_whitespace;

/// One compiled selection or filtering instruction.
#[derive(Debug, Clone)]
pub enum Step {
    /// Expand every candidate to its descendants matching `selector`.
    Get { css: String, selector: Selector },
    /// Keep candidates whose normalized text contains the (normalized) needle.
    HaveText(String),
}

impl Step {
    /// Parses a step such as `"get:div.card"` or `"haveText:Tuition"`.
    pub fn parse(step: &str) -> Result<Step, ExtractError> {
        let trimmed = step.trim();
        let (action, arg) = trimmed
            .split_once(':')
            .ok_or_else(|| ExtractError::invalid_step(step))?;
        let action = action.trim().to_lowercase();
        let arg = arg.trim();

        let step = match action.as_str() {
            "get" | "find" => {
                if arg.is_empty() {
                    return Err(ExtractError::missing_argument(step));
                }
                let selector =
                    get_or_compile(arg).ok_or_else(|| ExtractError::invalid_selector(step))?;
                Step::Get {
                    css: arg.to_string(),
                    selector,
                }
            }
            "havetext" => {
                if arg.is_empty() {
                    return Err(ExtractError::missing_argument(step));
                }
                Step::HaveText(normalize_whitespace(arg))
            }
            _ => return Err(ExtractError::unknown_action(step)),
        };
        Ok(step)
    }

    /// Returns the needle for `haveText` steps.
    pub fn needle(&self) -> Option<&str> {
        match self {
            Step::HaveText(needle) => Some(needle),
            Step::Get { .. } => None,
        }
    }
}

impl FromStr for Step {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Step::parse(s)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Get { css, .. } => write!(f, "get:{}", css),
            Step::HaveText(needle) => write!(f, "haveText:{}", needle),
        }
    }
}

/// Parses a whole step sequence, failing on the first malformed step.
pub fn parse_steps(steps: &[String]) -> Result<Vec<Step>, ExtractError> {
    steps.iter().map(|s| Step::parse(s)).collect()
}

/// Returns the element's text with all descendant text nodes concatenated as-is.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Returns true if the element's normalized text contains the already-normalized needle.
pub fn contains_text(el: ElementRef<'_>, needle: &str) -> bool {
    normalize_whitespace(&element_text(el)).contains(needle)
}

/// Evaluates `steps` starting from `scope`, or from the whole document when `scope` is empty.
///
/// At document scope a leading `get` selects from the entire tree (so `get:html`
/// matches) and a leading `haveText` tests the root element's text.
pub fn apply_steps<'a>(doc: &'a Html, scope: &[ElementRef<'a>], steps: &[Step]) -> Vec<ElementRef<'a>> {
    let mut current: Vec<ElementRef<'a>> = scope.to_vec();
    for (i, step) in steps.iter().enumerate() {
        let at_document = i == 0 && scope.is_empty();
        current = match step {
            Step::Get { selector, .. } if at_document => doc.select(selector).collect(),
            Step::Get { selector, .. } => current
                .iter()
                .flat_map(|root| root.select(selector))
                .collect(),
            Step::HaveText(needle) => {
                let pool = if at_document {
                    vec![doc.root_element()]
                } else {
                    current
                };
                pool.into_iter()
                    .filter(|el| contains_text(*el, needle))
                    .collect()
            }
        };
        if current.is_empty() {
            return current;
        }
    }
    current
}
