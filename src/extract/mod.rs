//! Report extraction — turns the provider's free-form markdown into
//! structured views.
//!
//! - `sections`  — line scanner splitting the text into the four report parts
//! - `percent`   — `{region, percent}` extraction (table, then inline)
//! - `normalize` — idempotent markdown-to-prose cleanup

pub mod normalize;
pub mod percent;
pub mod sections;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One parsed ancestry entry. Order follows first appearance in the source
/// text; duplicate regions are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestryDatum {
    pub region: String,
    pub percent: u32,
}

impl AncestryDatum {
    /// A candidate survives only with a non-empty region and a percent
    /// in (0, 100]. Percentages are never normalized and may not sum to 100.
    pub fn validated(region: &str, percent: u32) -> Option<Self> {
        let region = region.trim();
        if region.is_empty() || percent == 0 || percent > 100 {
            return None;
        }
        Some(Self {
            region: region.to_string(),
            percent,
        })
    }
}

static FEATURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)nose|skin|eye|lip|ear|jaw|cheek|brow|forehead|chin|feature").unwrap()
});

/// The raw completion text. Sections and ancestry data are derived views,
/// recomputed from the text on every call rather than cached.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    raw: String,
}

impl AnalysisReport {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn sections(&self) -> sections::ReportSections {
        sections::split_sections(&self.raw)
    }

    pub fn ancestry(&self) -> Vec<AncestryDatum> {
        percent::extract_ancestry(&self.raw)
    }

    /// Lines mentioning a facial feature, shown as highlights on the result
    /// card.
    pub fn feature_highlights(&self) -> Vec<String> {
        self.raw
            .lines()
            .filter(|line| FEATURE_RE.is_match(line))
            .map(|line| normalize::normalize(line))
            .filter(|line| !line.is_empty())
            .collect()
    }
}
