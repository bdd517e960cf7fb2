//! `{region, percent}` extraction.
//!
//! Two strategies, tried in order: the markdown summary table, then inline
//! `Label: NN%` patterns. Values are taken as written — no deduplication and
//! no normalization to a 100% total.

use once_cell::sync::Lazy;
use regex::Regex;

use super::normalize::normalize;
use super::sections::split_sections;
use super::AncestryDatum;

/// Digits immediately before a percent sign.
static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,3})\s*%").unwrap());

/// `Label: NN%` at the start of a (normalized) line. The colon is optional and
/// a parenthetical aside after the label is ignored:
/// "Northern European (Celtic): 12%" yields "Northern European".
static INLINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z '\-]*?)\s*(?:\([^)]*\))?\s*:?\s*(\d{1,3})\s*%").unwrap()
});

/// A parsed markdown table: header cells plus data rows. Rows whose cell
/// count differs from the header are rejected during parsing, never
/// mis-aligned.
#[derive(Debug, Clone)]
pub struct MarkdownTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// True for a header separator row: `|`, `-`, and whitespace only.
fn is_separator(line: &str) -> bool {
    let t = line.trim();
    t.contains('-') && !t.is_empty() && t.chars().all(|c| c == '|' || c == '-' || c.is_whitespace())
}

/// Split a `|`-delimited row into trimmed cells, discarding the empty
/// leading/trailing cells produced by the outer pipes. Inner empty cells are
/// kept so ragged rows stay detectable.
fn split_cells(line: &str) -> Vec<String> {
    let mut cells: Vec<&str> = line.split('|').map(str::trim).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells.into_iter().map(String::from).collect()
}

/// Locate the separator row and reconstruct the table around it.
pub fn parse_table_lines(lines: &[String]) -> Option<MarkdownTable> {
    let sep_idx = lines.iter().position(|l| is_separator(l))?;
    if sep_idx == 0 {
        return None;
    }
    let header_line = &lines[sep_idx - 1];
    if !header_line.trim().starts_with('|') {
        return None;
    }
    let header = split_cells(header_line);
    if header.is_empty() {
        return None;
    }

    let rows = lines[sep_idx + 1..]
        .iter()
        .filter(|l| l.trim().starts_with('|') && !is_separator(l))
        .map(|l| split_cells(l))
        .filter(|cells| cells.len() == header.len())
        .collect();

    Some(MarkdownTable { header, rows })
}

/// Strategy 1: data rows of the summary table. Column 0 is the region,
/// column 1 the percentage; the justification column is unused here.
pub fn table_data(lines: &[String]) -> Vec<AncestryDatum> {
    let Some(table) = parse_table_lines(lines) else {
        return Vec::new();
    };
    table
        .rows
        .iter()
        .filter_map(|cells| {
            let percent = PERCENT_RE
                .captures(cells.get(1)?)?
                .get(1)?
                .as_str()
                .parse()
                .ok()?;
            AncestryDatum::validated(cells.first()?, percent)
        })
        .collect()
}

/// Strategy 2: inline `Label: NN%` lines. Lines are normalized first so
/// bullet and emphasis markers do not end up inside the region name.
pub fn inline_data(text: &str) -> Vec<AncestryDatum> {
    text.lines()
        .filter_map(|line| {
            let line = normalize(line);
            let caps = INLINE_RE.captures(&line)?;
            let percent = caps.get(2)?.as_str().parse().ok()?;
            AncestryDatum::validated(caps.get(1)?.as_str(), percent)
        })
        .collect()
}

/// Extract ancestry data from a full report: the summary table wins, then
/// the comprehensive-breakdown list, then any inline match in the whole text.
pub fn extract_ancestry(text: &str) -> Vec<AncestryDatum> {
    let sections = split_sections(text);

    let from_table = table_data(&sections.table_lines);
    if !from_table.is_empty() {
        return from_table;
    }

    let from_breakdown = inline_data(&sections.comprehensive.join("\n"));
    if !from_breakdown.is_empty() {
        return from_breakdown;
    }

    inline_data(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(String::from).collect()
    }

    const TABLE: &str = "\
| Region/Group | Estimated Percentage | Key Traits & Justification |
|--------------|---------------------|---------------------------|
| West African | 40% | Broad nasal bridge |
| Northern European | 35% | Light eye pigmentation |
| East Asian | 25% | Epicanthic folds |";

    #[test]
    fn table_rows_parse_in_order() {
        let data = table_data(&lines(TABLE));
        assert_eq!(data.len(), 3);
        assert_eq!(data[0].region, "West African");
        assert_eq!(data[0].percent, 40);
        assert_eq!(data[2].region, "East Asian");
        assert_eq!(data[2].percent, 25);
    }

    #[test]
    fn ragged_rows_are_rejected_not_misaligned() {
        let text = format!("{TABLE}\n| Oceanian | 10% |\n| a | b | c | d |");
        let data = table_data(&lines(&text));
        assert_eq!(data.len(), 3);
        assert!(!data.iter().any(|d| d.region == "Oceanian"));
    }

    #[test]
    fn table_without_separator_yields_nothing() {
        let data = table_data(&lines("| a | 30% | x |\n| b | 40% | y |"));
        assert!(data.is_empty());
    }

    #[test]
    fn inline_basic_and_parenthetical() {
        let data = inline_data("West African: 34%\nNorthern European(Celtic): 12%");
        assert_eq!(
            data,
            vec![
                AncestryDatum {
                    region: "West African".into(),
                    percent: 34
                },
                AncestryDatum {
                    region: "Northern European".into(),
                    percent: 12
                },
            ]
        );
    }

    #[test]
    fn inline_tolerates_bullets_bold_and_missing_colon() {
        let data = inline_data("- **Iberian:** 22%\nScandinavian 18%");
        assert_eq!(data[0].region, "Iberian");
        assert_eq!(data[0].percent, 22);
        assert_eq!(data[1].region, "Scandinavian");
        assert_eq!(data[1].percent, 18);
    }

    #[test]
    fn zero_percent_is_excluded() {
        assert!(inline_data("Region: 0%").is_empty());
    }

    #[test]
    fn totals_are_not_normalized() {
        let data = inline_data("A: 70%\nB: 45%");
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].percent, 70);
        assert_eq!(data[1].percent, 45);
    }

    #[test]
    fn duplicate_regions_are_kept() {
        let data = inline_data("Baltic: 20%\nBaltic: 15%");
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn extract_prefers_table_over_inline() {
        let text = format!(
            "Prose about ancestry.\n\n\
             Comprehensive Ancestry Percentage Breakdown:\n\
             - **West African:** 99%\n\n\
             ## SUMMARY TABLE\n\n{TABLE}"
        );
        let data = extract_ancestry(&text);
        assert_eq!(data.len(), 3);
        assert_eq!(data[0].percent, 40);
    }

    #[test]
    fn extract_falls_back_to_breakdown_list() {
        let text = "Comprehensive Ancestry Percentage Breakdown:\n\
                    - **West African:** 60%\n\
                    - **East Asian:** 40%";
        let data = extract_ancestry(text);
        assert_eq!(data.len(), 2);
        assert_eq!(data[1].region, "East Asian");
    }
}
