// ABOUTME: Athletics table sub-extractor for the "sports offered, by gender" tables.
// ABOUTME: Parses the tabular and the stacked DOM layouts behind one TableLayout trait.

//! Sports offerings by gender.
//!
//! Each category is a `div[data-test-id=...]` wrapper whose class tells which
//! of two layouts it uses:
//! - tabular: one row per sport; name in cell 0, men in cell 2, women in cell 4.
//! - stacked: one block per sport; its inner table has a name row, a men row
//!   and a women row (after a leading caption row).
//!
//! A cell means "offered" when its icon's `<title>` is `Yes`, or failing that
//! when the icon reference points at the check icon.

use scraper::{ElementRef, Html};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::extractors::compiled::get_or_compile;

const TABULAR_CONTAINER_CLASS: &str = "Table__TabularContainer-k11szb-1";
const STACKED_CONTAINER_CLASS: &str = "Table__StackedContainer-k11szb-0";
const TABULAR_ROW_CLASS: &str = "TableTabular__TableRow-impg-1";
const SCHOLARSHIP_INDICATOR: &str = "[data-test-id='v_schol_sports']";
const NOT_AVAILABLE: &str = "N/A";

/// The four sports categories of a profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SportsCategory {
    NonScholarship,
    Scholarship,
    Club,
    IntramuralRecreational,
}

impl SportsCategory {
    pub const ALL: [SportsCategory; 4] = [
        SportsCategory::NonScholarship,
        SportsCategory::Scholarship,
        SportsCategory::Club,
        SportsCategory::IntramuralRecreational,
    ];

    /// The field-path suffix requesting this category.
    pub fn suffix(self) -> &'static str {
        match self {
            SportsCategory::NonScholarship => ".nonscholarshipSports",
            SportsCategory::Scholarship => ".scholarshipSports",
            SportsCategory::Club => ".clubSports",
            SportsCategory::IntramuralRecreational => ".intramuralRecreationalSports",
        }
    }

    /// The `data-test-id` of the category's table wrapper.
    pub fn test_id(self) -> &'static str {
        match self {
            SportsCategory::NonScholarship => "v_ncaa_sports",
            SportsCategory::Scholarship => "v_schol_sports",
            SportsCategory::Club => "v_club_sports",
            SportsCategory::IntramuralRecreational => "v_intr_sports",
        }
    }

    /// Picks the category by exact suffix, so `.nonscholarshipSports` never reads as `.scholarshipSports`.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| path.ends_with(c.suffix()))
    }
}

/// Sport names offered to men and to women.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SportsByGender {
    pub men: Vec<String>,
    pub women: Vec<String>,
}

impl SportsByGender {
    fn push(&mut self, row: SportRow) {
        if row.men {
            self.men.push(row.name.clone());
        }
        if row.women {
            self.women.push(row.name);
        }
    }

    /// Removes repeated names, keeping the first occurrence.
    fn dedup(&mut self) {
        dedup_in_order(&mut self.men);
        dedup_in_order(&mut self.women);
    }

    pub fn to_value(&self) -> Value {
        json!({ "men": self.men, "women": self.women })
    }
}

fn dedup_in_order(names: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    names.retain(|n| seen.insert(n.clone()));
}

/// Scholarship sports, which the page may explicitly mark as not available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScholarshipSports {
    NotAvailable,
    Listed(SportsByGender),
}

impl ScholarshipSports {
    pub fn to_value(&self) -> Value {
        match self {
            ScholarshipSports::NotAvailable => Value::String(NOT_AVAILABLE.to_string()),
            ScholarshipSports::Listed(sports) => sports.to_value(),
        }
    }
}

/// All sports categories of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SportsSection {
    pub scholarship: ScholarshipSports,
    pub non_scholarship: SportsByGender,
    pub club: SportsByGender,
    pub intramural_recreational: SportsByGender,
}

impl SportsSection {
    /// Returns the JSON value of one category.
    pub fn value_for(&self, category: SportsCategory) -> Value {
        match category {
            SportsCategory::Scholarship => self.scholarship.to_value(),
            SportsCategory::NonScholarship => self.non_scholarship.to_value(),
            SportsCategory::Club => self.club.to_value(),
            SportsCategory::IntramuralRecreational => self.intramural_recreational.to_value(),
        }
    }
}

/// One parsed sport row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SportRow {
    name: String,
    men: bool,
    women: bool,
}

/// A DOM rendering of a sports table.
trait TableLayout {
    const CONTAINER_CLASS: &'static str;

    fn rows(container: ElementRef<'_>) -> Vec<SportRow>;

    fn containers<'a>(doc: &'a Html, test_id: &str) -> Vec<ElementRef<'a>> {
        let css = format!("div[data-test-id='{}'].{}", test_id, Self::CONTAINER_CLASS);
        match get_or_compile(&css) {
            Some(sel) => doc.select(&sel).collect(),
            None => Vec::new(),
        }
    }

    fn parse(containers: &[ElementRef<'_>]) -> SportsByGender {
        let mut sports = SportsByGender::default();
        for row in containers.iter().flat_map(|c| Self::rows(*c)) {
            sports.push(row);
        }
        sports.dedup();
        sports
    }
}

struct Tabular;

impl TableLayout for Tabular {
    const CONTAINER_CLASS: &'static str = TABULAR_CONTAINER_CLASS;

    fn rows(container: ElementRef<'_>) -> Vec<SportRow> {
        let (Some(row_sel), Some(cell_sel)) = (
            get_or_compile(&format!("table tbody tr.{}", TABULAR_ROW_CLASS)),
            get_or_compile("td"),
        ) else {
            return Vec::new();
        };

        container
            .select(&row_sel)
            .filter_map(|tr| {
                let cells: Vec<ElementRef<'_>> = tr.select(&cell_sel).collect();
                let name = cells.first().map(|c| trimmed_text(*c)).unwrap_or_default();
                if name.is_empty() {
                    return None;
                }
                Some(SportRow {
                    name,
                    men: cells.get(2).is_some_and(|c| is_offered(*c)),
                    women: cells.get(4).is_some_and(|c| is_offered(*c)),
                })
            })
            .collect()
    }
}

struct Stacked;

impl TableLayout for Stacked {
    const CONTAINER_CLASS: &'static str = STACKED_CONTAINER_CLASS;

    fn rows(container: ElementRef<'_>) -> Vec<SportRow> {
        let Some(header_sel) = get_or_compile(".header") else {
            return Vec::new();
        };

        table_rows(container)
            .into_iter()
            .filter_map(|outer| {
                let block = child_elements(outer, "td")
                    .flat_map(table_rows)
                    .collect::<Vec<_>>();
                if block.len() < 4 {
                    return None;
                }
                let name = block[1]
                    .select(&header_sel)
                    .next()
                    .map(trimmed_text)
                    .unwrap_or_default();
                if name.is_empty() {
                    return None;
                }
                Some(SportRow {
                    name,
                    men: first_cell(block[2]).is_some_and(is_offered),
                    women: first_cell(block[3]).is_some_and(is_offered),
                })
            })
            .collect()
    }
}

/// Direct `> table > tbody > tr` rows of an element.
fn table_rows(el: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    child_elements(el, "table")
        .flat_map(|table| child_elements(table, "tbody"))
        .flat_map(|tbody| child_elements(tbody, "tr"))
        .collect()
}

fn child_elements<'a>(el: ElementRef<'a>, tag: &'static str) -> impl Iterator<Item = ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}

fn first_cell(row: ElementRef<'_>) -> Option<ElementRef<'_>> {
    child_elements(row, "td").next()
}

fn trimmed_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Reads a yes/no icon cell: `<title>` first, then the icon reference.
fn is_offered(cell: ElementRef<'_>) -> bool {
    let descendants = || cell.descendants().filter_map(ElementRef::wrap);

    if let Some(title) = descendants().find(|e| e.value().name() == "title") {
        match trimmed_text(title).as_str() {
            "Yes" => return true,
            "No" => return false,
            _ => {}
        }
    }

    let href = descendants()
        .find(|e| e.value().name() == "use")
        .and_then(|u| {
            u.value()
                .attrs()
                .find(|(name, _)| *name == "href" || *name == "xlink:href")
                .map(|(_, value)| value.to_string())
        })
        .unwrap_or_default();
    if href.contains("check-pro") {
        return true;
    }
    // "x-con" and anything unrecognized count as not offered
    false
}

/// Parses one category, preferring the tabular layout.
fn parse_category(doc: &Html, category: SportsCategory) -> SportsByGender {
    let tabular = Tabular::containers(doc, category.test_id());
    if !tabular.is_empty() {
        return Tabular::parse(&tabular);
    }
    debug!(test_id = category.test_id(), "no tabular sports table, trying stacked layout");
    Stacked::parse(&Stacked::containers(doc, category.test_id()))
}

fn parse_scholarship(doc: &Html) -> ScholarshipSports {
    let indicator = get_or_compile(SCHOLARSHIP_INDICATOR)
        .and_then(|sel| doc.select(&sel).next().map(trimmed_text))
        .unwrap_or_default();
    if indicator.is_empty() || indicator.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return ScholarshipSports::NotAvailable;
    }
    ScholarshipSports::Listed(parse_category(doc, SportsCategory::Scholarship))
}

/// Extracts every sports category from a profile page.
pub fn extract_sports(doc: &Html) -> SportsSection {
    SportsSection {
        scholarship: parse_scholarship(doc),
        non_scholarship: parse_category(doc, SportsCategory::NonScholarship),
        club: parse_category(doc, SportsCategory::Club),
        intramural_recreational: parse_category(doc, SportsCategory::IntramuralRecreational),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const YES: &str = r##"<svg><title>Yes</title><use xlink:href="#check-pro"></use></svg>"##;
    const NO: &str = r##"<svg><title>No</title><use xlink:href="#x-con"></use></svg>"##;
    const YES_ICON_ONLY: &str = r##"<svg><use xlink:href="#check-pro"></use></svg>"##;
    const NO_ICON_ONLY: &str = r##"<svg><use xlink:href="#x-con"></use></svg>"##;

    fn tabular_row(name: &str, men: &str, women: &str) -> String {
        format!(
            r#"<tr class="{row}"><td>{name}</td><td></td><td>{men}</td><td></td><td>{women}</td></tr>"#,
            row = TABULAR_ROW_CLASS
        )
    }

    fn tabular(test_id: &str, rows: &[String]) -> String {
        format!(
            r#"<div data-test-id="{id}" class="{cls}"><table><tbody>{rows}</tbody></table></div>"#,
            id = test_id,
            cls = TABULAR_CONTAINER_CLASS,
            rows = rows.concat()
        )
    }

    fn stacked_block(name: &str, men: &str, women: &str) -> String {
        format!(
            r#"<tr><td><table><tbody>
                <tr><td>Sport</td></tr>
                <tr><td><span class="header">{name}</span></td></tr>
                <tr><td>{men}</td><td>Men's</td></tr>
                <tr><td>{women}</td><td>Women's</td></tr>
            </tbody></table></td></tr>"#
        )
    }

    fn stacked(test_id: &str, blocks: &[String]) -> String {
        format!(
            r#"<div data-test-id="{id}" class="{cls}"><table><tbody>{blocks}</tbody></table></div>"#,
            id = test_id,
            cls = STACKED_CONTAINER_CLASS,
            blocks = blocks.concat()
        )
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_path_exact_suffix() {
        assert_eq!(
            SportsCategory::from_path("studentLife.sports.nonscholarshipSports"),
            Some(SportsCategory::NonScholarship)
        );
        assert_eq!(
            SportsCategory::from_path("studentLife.sports.scholarshipSports"),
            Some(SportsCategory::Scholarship)
        );
        assert_eq!(
            SportsCategory::from_path("studentLife.sports.intramuralRecreationalSports"),
            Some(SportsCategory::IntramuralRecreational)
        );
        assert_eq!(SportsCategory::from_path("studentLife.sports.clubSportsCount"), None);
    }

    #[test]
    fn test_tabular_layout() {
        let html = tabular(
            "v_ncaa_sports",
            &[
                tabular_row("Basketball", YES, YES),
                tabular_row("Football", YES, NO),
                tabular_row("Softball", NO, YES_ICON_ONLY),
            ],
        );
        let doc = Html::parse_document(&html);
        let section = extract_sports(&doc);
        assert_eq!(section.non_scholarship.men, names(&["Basketball", "Football"]));
        assert_eq!(section.non_scholarship.women, names(&["Basketball", "Softball"]));
    }

    #[test]
    fn test_duplicate_rows_are_deduplicated() {
        let html = tabular(
            "v_club_sports",
            &[
                tabular_row("Rugby", YES, NO),
                tabular_row("Rugby", YES, NO),
                tabular_row("Rowing", YES, YES),
            ],
        );
        let doc = Html::parse_document(&html);
        let section = extract_sports(&doc);
        assert_eq!(section.club.men, names(&["Rugby", "Rowing"]));
        assert_eq!(section.club.women, names(&["Rowing"]));
    }

    #[test]
    fn test_stacked_layout() {
        let html = stacked(
            "v_intr_sports",
            &[
                stacked_block("Volleyball", YES, YES),
                stacked_block("Wrestling", YES, NO),
                stacked_block("", YES, YES),
            ],
        );
        let doc = Html::parse_document(&html);
        let section = extract_sports(&doc);
        assert_eq!(
            section.intramural_recreational,
            SportsByGender {
                men: names(&["Volleyball", "Wrestling"]),
                women: names(&["Volleyball"]),
            }
        );
    }

    #[test]
    fn test_stacked_duplicate_blocks_are_deduplicated() {
        let html = stacked(
            "v_club_sports",
            &[
                stacked_block("Lacrosse", YES, YES),
                stacked_block("Lacrosse", YES, YES),
                stacked_block("Sailing", NO, YES),
            ],
        );
        let doc = Html::parse_document(&html);
        let section = extract_sports(&doc);
        assert_eq!(section.club.men, names(&["Lacrosse"]));
        assert_eq!(section.club.women, names(&["Lacrosse", "Sailing"]));
    }

    #[test]
    fn test_crossed_icon_without_title_is_not_offered() {
        let html = tabular(
            "v_ncaa_sports",
            &[tabular_row("Fencing", NO_ICON_ONLY, YES_ICON_ONLY)],
        );
        let doc = Html::parse_document(&html);
        let section = extract_sports(&doc);
        assert!(section.non_scholarship.men.is_empty());
        assert_eq!(section.non_scholarship.women, names(&["Fencing"]));

        let html = stacked("v_intr_sports", &[stacked_block("Squash", NO_ICON_ONLY, NO_ICON_ONLY)]);
        let doc = Html::parse_document(&html);
        let section = extract_sports(&doc);
        assert_eq!(section.intramural_recreational, SportsByGender::default());
    }

    #[test]
    fn test_tabular_preferred_over_stacked() {
        let html = format!(
            "{}{}",
            stacked("v_ncaa_sports", &[stacked_block("Golf", YES, YES)]),
            tabular("v_ncaa_sports", &[tabular_row("Tennis", YES, NO)])
        );
        let doc = Html::parse_document(&html);
        let section = extract_sports(&doc);
        assert_eq!(section.non_scholarship.men, names(&["Tennis"]));
        assert!(section.non_scholarship.women.is_empty());
    }

    #[test]
    fn test_scholarship_sentinel() {
        for indicator in ["n/a", "N/A", "  "] {
            let html = format!(
                r#"<p data-test-id="v_schol_sports">{}</p>{}"#,
                indicator,
                tabular("v_schol_sports", &[tabular_row("Soccer", YES, YES)])
            );
            let doc = Html::parse_document(&html);
            let section = extract_sports(&doc);
            assert_eq!(section.scholarship, ScholarshipSports::NotAvailable);
            assert_eq!(
                section.value_for(SportsCategory::Scholarship),
                Value::String("N/A".into())
            );
        }
    }

    #[test]
    fn test_scholarship_table_parsed_when_indicator_present() {
        let html = tabular("v_schol_sports", &[tabular_row("Soccer", YES, YES)]);
        let doc = Html::parse_document(&html);
        let section = extract_sports(&doc);
        assert_eq!(
            section.value_for(SportsCategory::Scholarship),
            json!({"men": ["Soccer"], "women": ["Soccer"]})
        );
    }

    #[test]
    fn test_missing_tables_are_empty() {
        let doc = Html::parse_document("<html><body><p>No athletics</p></body></html>");
        let section = extract_sports(&doc);
        assert_eq!(section.scholarship, ScholarshipSports::NotAvailable);
        assert_eq!(
            section.value_for(SportsCategory::Club),
            json!({"men": [], "women": []})
        );
    }
}
