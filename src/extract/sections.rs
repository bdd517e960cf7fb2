//! Splits the raw completion into the four report parts with a single
//! forward scan.
//!
//! The scanner keeps a sticky current-section tag. Trigger phrases win in
//! order of appearance and hold until the next trigger or end of input:
//!
//! - "comprehensive ancestry percentage" → `comprehensive` (line kept)
//! - "summary table" / `## SUMMARY TABLE` → `table` (line consumed)
//! - a line starting with "conclusion"    → `conclusion` (line consumed)
//!
//! Without any trigger the whole text is `analysis`.

/// The four derived line lists. Any of them may be empty.
#[derive(Debug, Clone, Default)]
pub struct ReportSections {
    /// Free-form analysis prose, joined into logical paragraphs.
    pub analysis: Vec<String>,
    /// The "comprehensive ancestry percentage breakdown" list, one line each.
    pub comprehensive: Vec<String>,
    /// Raw markdown table lines (`|`-rows and separator rows only).
    pub table_lines: Vec<String>,
    /// Conclusion paragraph lines.
    pub conclusion: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Analysis,
    Comprehensive,
    Table,
    Conclusion,
}

pub fn split_sections(text: &str) -> ReportSections {
    let mut out = ReportSections::default();
    let mut current = Section::Analysis;
    // Open paragraph accumulator; only the analysis section joins lines.
    let mut paragraph = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();

        if lower.contains("comprehensive ancestry percentage") {
            flush(&mut paragraph, &mut out);
            current = Section::Comprehensive;
            out.comprehensive.push(trimmed.to_string());
            continue;
        }
        if lower.contains("summary table") || trimmed == "## SUMMARY TABLE" {
            flush(&mut paragraph, &mut out);
            current = Section::Table;
            continue;
        }
        // Emphasis and heading markers around the word do not hide the trigger
        // ("**Conclusion:**" and "Conclusion:" both switch).
        if lower.trim_start_matches(['*', '#', ' ']).starts_with("conclusion") {
            flush(&mut paragraph, &mut out);
            current = Section::Conclusion;
            continue;
        }

        match current {
            Section::Analysis => {
                if trimmed.is_empty() {
                    flush(&mut paragraph, &mut out);
                } else if paragraph.is_empty() {
                    paragraph.push_str(trimmed);
                } else {
                    paragraph.push(' ');
                    paragraph.push_str(trimmed);
                }
            }
            Section::Comprehensive => {
                if !trimmed.is_empty() {
                    out.comprehensive.push(trimmed.to_string());
                }
            }
            Section::Table => {
                // Only markdown table syntax is captured; anything else is
                // silently dropped.
                if trimmed.starts_with('|') || trimmed.contains("---") {
                    out.table_lines.push(line.to_string());
                }
            }
            Section::Conclusion => {
                if !trimmed.is_empty() {
                    out.conclusion.push(trimmed.to_string());
                }
            }
        }
    }

    flush(&mut paragraph, &mut out);
    out
}

// Paragraphs only ever accumulate while scanning analysis prose.
fn flush(paragraph: &mut String, out: &mut ReportSections) {
    if !paragraph.is_empty() {
        out.analysis.push(std::mem::take(paragraph));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Here is a breakdown of the observed traits.
The jawline and cheekbones suggest admixture.

**Comprehensive Ancestry Percentage Breakdown:**
- **West African:** 40%
- **Northern European:** 35%

### SUMMARY TABLE

| Region/Group | Estimated Percentage | Key Traits & Justification |
|--------------|---------------------|---------------------------|
| West African | 40% | Broad nasal bridge |
| Northern European | 35% | Light eye pigmentation |

**Conclusion:**
The analysis points to a predominantly West African lineage.
";

    #[test]
    fn splits_all_four_sections() {
        let s = split_sections(SAMPLE);
        assert!(!s.analysis.is_empty());
        assert!(!s.comprehensive.is_empty());
        assert!(s.table_lines.len() >= 3);
        assert!(!s.conclusion.is_empty());
    }

    #[test]
    fn no_line_lands_in_two_sections() {
        let s = split_sections(SAMPLE);
        for table_line in &s.table_lines {
            let t = table_line.trim();
            assert!(!s.comprehensive.iter().any(|l| l == t));
            assert!(!s.conclusion.iter().any(|l| l == t));
            assert!(!s.analysis.iter().any(|p| p.contains(t)));
        }
        for c in &s.conclusion {
            assert!(!s.comprehensive.contains(c));
        }
    }

    #[test]
    fn analysis_joins_paragraphs_on_blank_lines() {
        let s = split_sections("one\ntwo\n\nthree\nfour");
        assert_eq!(s.analysis, vec!["one two", "three four"]);
    }

    #[test]
    fn text_without_markers_is_all_analysis() {
        let s = split_sections("just some prose\nwith no markers at all");
        assert_eq!(s.analysis.len(), 1);
        assert!(s.comprehensive.is_empty());
        assert!(s.table_lines.is_empty());
        assert!(s.conclusion.is_empty());
    }

    #[test]
    fn marker_line_is_kept_for_comprehensive_only() {
        let s = split_sections(SAMPLE);
        assert!(s.comprehensive[0]
            .to_lowercase()
            .contains("comprehensive ancestry percentage"));
        assert!(!s
            .conclusion
            .iter()
            .any(|l| l.to_lowercase().contains("conclusion")));
    }

    #[test]
    fn non_table_lines_inside_table_section_are_dropped() {
        let s = split_sections(
            "## SUMMARY TABLE\n| a | b | c |\n|---|---|---|\nstray prose\n| d | e | f |",
        );
        assert_eq!(s.table_lines.len(), 3);
    }

    #[test]
    fn unclosed_paragraph_is_flushed_at_end() {
        let s = split_sections("trailing paragraph with no blank line");
        assert_eq!(s.analysis.len(), 1);
    }
}
