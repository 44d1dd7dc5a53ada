// ABOUTME: Field evaluator resolving a field's find/getText steps to candidate elements and raw text.
// ABOUTME: Scalar fields use the first candidate; getText narrows inside it with a fallback to its own text.

//! Generic field evaluation.
//!
//! Key behaviors:
//! - `find` runs from the document root.
//! - `getText` runs scoped to one candidate; when it matches nothing the
//!   candidate's own text is used instead.
//! - No candidate at all means no text (`None`), which casts to `null`.

use scraper::{ElementRef, Html};

use crate::extractors::steps::{apply_steps, element_text, Step};

/// Returns all candidates for a field's `find` steps, in document order.
pub fn find_candidates<'a>(doc: &'a Html, find: &[Step]) -> Vec<ElementRef<'a>> {
    if find.is_empty() {
        return Vec::new();
    }
    apply_steps(doc, &[], find)
}

/// Resolves the value text of one element.
///
/// With `get_text` steps, the first element they reach inside `el` supplies
/// the text; if they reach nothing, `el`'s own text is used.
pub fn resolve_text<'a>(doc: &'a Html, el: ElementRef<'a>, get_text: &[Step]) -> String {
    if !get_text.is_empty() {
        if let Some(inner) = apply_steps(doc, &[el], get_text).into_iter().next() {
            return element_text(inner);
        }
    }
    element_text(el)
}

/// Resolves the raw text of a single-valued field: the first candidate's text, or `None`.
pub fn extract_field_text(doc: &Html, find: &[Step], get_text: &[Step]) -> Option<String> {
    let first = find_candidates(doc, find).into_iter().next()?;
    Some(resolve_text(doc, first, get_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::steps::parse_steps;

    const SAMPLE_HTML: &str = r#"
        <div class="stat"><span class="label">Acceptance rate</span><span class="value">45%</span></div>
        <div class="stat"><span class="label">Tuition</span>$12,000</div>
        <div class="stat"><span class="label">Tuition</span><span class="value">$15,000</span></div>
    "#;

    fn steps(raw: &[&str]) -> Vec<Step> {
        parse_steps(&raw.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn test_first_candidate_with_get_text() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let text = extract_field_text(
            &doc,
            &steps(&["get:div.stat", "haveText:Acceptance"]),
            &steps(&["get:span.value"]),
        );
        assert_eq!(text.as_deref(), Some("45%"));
    }

    #[test]
    fn test_get_text_falls_back_to_candidate_text() {
        let doc = Html::parse_document(SAMPLE_HTML);
        // The first Tuition card has no span.value; no look-ahead to the second card
        let text = extract_field_text(
            &doc,
            &steps(&["get:div.stat", "haveText:Tuition"]),
            &steps(&["get:span.value"]),
        );
        assert_eq!(text.as_deref(), Some("Tuition$12,000"));
    }

    #[test]
    fn test_no_match_is_none() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let text = extract_field_text(&doc, &steps(&["get:div.stat", "haveText:Endowment"]), &[]);
        assert!(text.is_none());
    }

    #[test]
    fn test_empty_find_has_no_candidates() {
        let doc = Html::parse_document(SAMPLE_HTML);
        assert!(find_candidates(&doc, &[]).is_empty());
    }
}
