//! A4 layout of the extracted report.
//!
//! Page order mirrors the on-screen reading: cover, analysis,
//! comprehensive breakdown, summary table, conclusion, chart + legend,
//! percentages list. Every flow paginates itself; a failed chart embed
//! falls back to drawing the pie directly and never aborts the document.

use std::f32::consts::PI;
use std::path::Path;

use log::warn;
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;

use crate::extract::percent::{parse_table_lines, MarkdownTable};
use crate::extract::{normalize::normalize, AncestryDatum, AnalysisReport};
use crate::report::chart::{slice_color, slices};
use crate::report::pdf::{Font, PdfError, PdfWriter, Rgb, PAGE_HEIGHT, PAGE_WIDTH};

const MARGIN: f32 = 40.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const BODY_SIZE: f32 = 13.0;
const HEADING_SIZE: f32 = 15.0;

const INK: Rgb = [35, 37, 43];
const BODY: Rgb = [51, 51, 51];
const ACCENT: Rgb = [47, 128, 237];
const MUTED: Rgb = [136, 136, 136];
const TINT: Rgb = [252, 252, 255];

pub struct RenderOptions<'a> {
    /// Shown on the cover as "Generated for: …". Passed explicitly; the
    /// renderer reads no ambient state.
    pub user_label: Option<&'a str>,
    /// Pre-rendered chart image (PNG/JPEG bytes). Invalid or missing data
    /// falls back to the built-in pie drawing.
    pub chart_image: Option<&'a [u8]>,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            user_label: None,
            chart_image: None,
        }
    }
}

/// Lay the whole report out; call `save` on the result (or use
/// [`save_report`]).
pub fn render_report(report: &AnalysisReport, opts: &RenderOptions) -> PdfWriter {
    let mut w = PdfWriter::new();
    let sections = report.sections();
    let data = report.ancestry();

    cover_page(&mut w, opts.user_label);

    if !sections.analysis.is_empty() {
        section_page(&mut w, "Analysis", 160.0, false);
        flow_paragraphs(&mut w, &sections.analysis);
    }
    if !sections.comprehensive.is_empty() {
        section_page(&mut w, "Comprehensive Ancestry Breakdown", 360.0, true);
        flow_paragraphs(&mut w, &sections.comprehensive);
    }
    if let Some(table) = parse_table_lines(&sections.table_lines) {
        section_page(&mut w, "Summary Table", 160.0, true);
        flow_table(&mut w, &table);
    }
    if !sections.conclusion.is_empty() {
        section_page(&mut w, "Conclusion", 140.0, false);
        flow_paragraphs(&mut w, &sections.conclusion);
    }
    if !data.is_empty() {
        chart_page(&mut w, &data, opts.chart_image);
        percentages_page(&mut w, &data);
    }

    w
}

pub fn save_report(
    report: &AnalysisReport,
    opts: &RenderOptions,
    path: &Path,
) -> Result<(), PdfError> {
    render_report(report, opts).save(path)
}

/// Greedy word wrap against the estimated glyph width. Words longer than a
/// line are hard-split rather than dropped.
pub fn wrap_text(text: &str, width: f32, font: Font, size: f32) -> Vec<String> {
    let max_chars = ((width / (size * font.width_factor())) as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            let split: String = word.chars().take(max_chars).collect();
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(split.clone());
            word = &word[split.len()..];
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// Curly punctuation from the model renders badly in the base fonts.
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '-',
            c => c,
        })
        .collect()
}

struct Flow<'w> {
    w: &'w mut PdfWriter,
    y: f32,
}

impl<'w> Flow<'w> {
    fn at(w: &'w mut PdfWriter, y: f32) -> Self {
        Self { w, y }
    }

    /// Start a fresh page when fewer than `needed` points remain.
    fn ensure(&mut self, needed: f32) {
        if self.y + needed > PAGE_HEIGHT - MARGIN {
            self.w.new_page();
            self.y = MARGIN + 20.0;
        }
    }
}

fn cover_page(w: &mut PdfWriter, user_label: Option<&str>) {
    w.fill_rect(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT, [245, 246, 250]);
    w.text_centered(120.0, Font::Bold, 34.0, INK, "Ancestry Analysis Report");
    w.text_centered(160.0, Font::Regular, 18.0, [85, 85, 85], "Generated with Rootlens");

    let stamp = OffsetDateTime::now_utc()
        .format(&Rfc2822)
        .unwrap_or_default();
    // Drop the weekday/time tail ("Mon, 03 Aug 2026 ..." -> "03 Aug 2026").
    let date = match stamp.split_once(", ") {
        Some((_, rest)) => rest.chars().take(11).collect::<String>(),
        None => stamp,
    };
    w.text_centered(200.0, Font::Regular, BODY_SIZE, MUTED, &format!("Date: {date}"));

    if let Some(label) = user_label {
        w.text_centered(
            240.0,
            Font::Bold,
            18.0,
            ACCENT,
            &printable(&format!("Generated for: {label}")),
        );
    }

    w.line(100.0, 350.0, PAGE_WIDTH - 100.0, 350.0, 1.0, [200, 200, 200]);

    w.text_centered(
        PAGE_HEIGHT - 100.0,
        Font::Italic,
        BODY_SIZE,
        [153, 153, 153],
        "This report contains AI-generated ancestry analysis based on facial features.",
    );
    w.text_centered(
        PAGE_HEIGHT - 80.0,
        Font::Italic,
        BODY_SIZE,
        [153, 153, 153],
        "Results are for entertainment purposes only.",
    );
}

/// Open a new page with the section title and its accent rule.
fn section_page(w: &mut PdfWriter, title: &str, rule_width: f32, tinted: bool) {
    w.new_page();
    if tinted {
        w.fill_rect(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT, TINT);
    }
    w.text(MARGIN, 60.0, Font::Bold, HEADING_SIZE, INK, title);
    w.line(MARGIN, 70.0, MARGIN + rule_width, 70.0, 2.0, ACCENT);
}

fn is_heading(para: &str) -> bool {
    let t = para.trim();
    let single_label = t.ends_with(':')
        && t.starts_with(|c: char| c.is_ascii_uppercase())
        && t.matches(':').count() == 1;
    let all_caps = !t.is_empty()
        && t.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_whitespace());
    let keyword = {
        let lower = t.to_lowercase();
        lower.contains("ancestry") || lower.contains("traits") || lower.contains("features")
    };
    single_label || all_caps || keyword
}

/// Word-wrapped paragraph flow with automatic page breaks. A label prefix
/// before a colon is set in bold, matching the report's "Trait: finding"
/// shape.
fn flow_paragraphs(w: &mut PdfWriter, paragraphs: &[String]) {
    let line_height = BODY_SIZE * 1.6;
    let mut flow = Flow::at(w, 100.0);

    for para in paragraphs {
        let para = printable(&normalize(para));
        if para.is_empty() {
            flow.y += line_height / 2.0;
            continue;
        }

        flow.ensure(line_height * 2.0);

        if is_heading(&para) {
            for line in wrap_text(&para, CONTENT_WIDTH, Font::Bold, HEADING_SIZE) {
                flow.ensure(line_height);
                flow.w
                    .text(MARGIN, flow.y, Font::Bold, HEADING_SIZE, INK, &line);
                flow.y += line_height;
            }
            flow.y += line_height;
            continue;
        }

        match para.split_once(':') {
            Some((label, rest)) if !label.is_empty() && !rest.trim().is_empty() => {
                let label = format!("{label}:");
                let rest = rest.trim();
                let label_width = Font::Bold.text_width(&label, HEADING_SIZE) + 4.0;
                if label_width + Font::Regular.text_width(rest, BODY_SIZE) <= CONTENT_WIDTH {
                    flow.ensure(line_height);
                    flow.w
                        .text(MARGIN, flow.y, Font::Bold, HEADING_SIZE, INK, &label);
                    flow.w.text(
                        MARGIN + label_width,
                        flow.y,
                        Font::Regular,
                        BODY_SIZE,
                        BODY,
                        rest,
                    );
                    flow.y += line_height;
                } else {
                    flow.ensure(line_height);
                    flow.w
                        .text(MARGIN, flow.y, Font::Bold, HEADING_SIZE, INK, &label);
                    flow.y += line_height;
                    for line in wrap_text(rest, CONTENT_WIDTH, Font::Regular, BODY_SIZE) {
                        flow.ensure(line_height);
                        flow.w
                            .text(MARGIN, flow.y, Font::Regular, BODY_SIZE, BODY, &line);
                        flow.y += line_height;
                    }
                }
            }
            _ => {
                for line in wrap_text(&para, CONTENT_WIDTH, Font::Regular, BODY_SIZE) {
                    flow.ensure(line_height);
                    flow.w
                        .text(MARGIN, flow.y, Font::Regular, BODY_SIZE, BODY, &line);
                    flow.y += line_height;
                }
            }
        }
        flow.y += line_height;
    }
}

/// Header plus body rows with alternating shading and a light grid.
fn flow_table(w: &mut PdfWriter, table: &MarkdownTable) {
    let widths: Vec<f32> = match table.header.len() {
        3 => vec![0.30, 0.20, 0.50],
        n => vec![1.0 / n as f32; n],
    }
    .iter()
    .map(|f| f * CONTENT_WIDTH)
    .collect();

    let mut flow = Flow::at(w, 100.0);
    draw_table_row(&mut flow, &widths, &table.header, Font::Bold, [235, 238, 245]);
    for (i, row) in table.rows.iter().enumerate() {
        let fill = if i % 2 == 0 {
            [255, 255, 255]
        } else {
            [248, 250, 252]
        };
        draw_table_row(&mut flow, &widths, row, Font::Regular, fill);
    }
}

fn draw_table_row(flow: &mut Flow, widths: &[f32], cells: &[String], font: Font, fill: Rgb) {
    const CELL_PAD: f32 = 6.0;
    let line_height = 12.0 * 1.4;

    let wrapped: Vec<Vec<String>> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            wrap_text(&printable(&normalize(cell)), width - 2.0 * CELL_PAD, font, 12.0)
        })
        .collect();
    let height = wrapped
        .iter()
        .map(|lines| lines.len().max(1))
        .max()
        .unwrap_or(1) as f32
        * line_height
        + 2.0 * CELL_PAD;
    flow.ensure(height);

    let top = flow.y - line_height + CELL_PAD;
    flow.w.fill_rect(MARGIN, top, CONTENT_WIDTH, height, fill);
    let mut x = MARGIN;
    for (lines, width) in wrapped.iter().zip(widths) {
        let mut y = flow.y + CELL_PAD;
        for line in lines {
            flow.w.text(x + CELL_PAD, y, font, 12.0, [17, 17, 17], line);
            y += line_height;
        }
        x += width;
    }
    flow.w.line(
        MARGIN,
        top + height,
        MARGIN + CONTENT_WIDTH,
        top + height,
        1.0,
        [200, 200, 200],
    );
    flow.y += height;
}

/// Chart page: embedded image when the bytes decode, otherwise the built-in
/// triangle-fan pie. Legend underneath either way.
fn chart_page(w: &mut PdfWriter, data: &[AncestryDatum], chart_image: Option<&[u8]>) {
    w.new_page();
    w.fill_rect(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT, TINT);
    w.text_centered(60.0, Font::Bold, HEADING_SIZE, INK, "Ancestry Visualization");

    let mut embedded = false;
    if let Some(bytes) = chart_image {
        match image::load_from_memory(bytes) {
            Ok(img) => {
                let rgb = img.to_rgb8();
                let (iw, ih) = rgb.dimensions();
                let handle = w.add_image(iw, ih, rgb.into_raw());
                let size = 350.0;
                w.draw_image(handle, (PAGE_WIDTH - size) / 2.0, 100.0, size, size);
                embedded = true;
            }
            Err(e) => warn!("chart image not embeddable, drawing fallback pie: {e}"),
        }
    }
    if !embedded {
        draw_pie_fan(w, data, PAGE_WIDTH / 2.0, 280.0, 120.0);
    }

    let mut flow = Flow::at(w, 480.0);
    let legend_x = PAGE_WIDTH / 2.0 - 120.0;
    for (i, d) in data.iter().enumerate() {
        flow.ensure(28.0);
        flow.w
            .fill_rect(legend_x, flow.y - 12.0, 16.0, 16.0, slice_color(i));
        flow.w.text(
            legend_x + 25.0,
            flow.y,
            Font::Regular,
            BODY_SIZE,
            INK,
            &printable(&format!("{}: {}%", d.region, d.percent)),
        );
        flow.y += 28.0;
    }
}

/// Approximate each slice with a fan of small triangles from the center.
fn draw_pie_fan(w: &mut PdfWriter, data: &[AncestryDatum], cx: f32, cy: f32, radius: f32) {
    let slices = slices(data);
    let point = |angle: f32| {
        let phi = angle - PI / 2.0;
        (cx + phi.cos() * radius, cy + phi.sin() * radius)
    };

    for slice in &slices {
        let segments = ((slice.sweep * 10.0) as usize).max(20);
        for i in 0..segments {
            let a1 = slice.start + slice.sweep * i as f32 / segments as f32;
            let a2 = slice.start + slice.sweep * (i + 1) as f32 / segments as f32;
            w.fill_triangle([(cx, cy), point(a1), point(a2)], slice.color);
        }
    }
    // White seams between slices.
    for slice in &slices {
        let (x, y) = point(slice.start);
        w.line(cx, cy, x, y, 2.0, [255, 255, 255]);
    }
}

/// Region / percent listing with separator rules and a closing note.
fn percentages_page(w: &mut PdfWriter, data: &[AncestryDatum]) {
    section_page(w, "Ancestry Percentages", 210.0, false);
    let mut flow = Flow::at(w, 110.0);

    for d in data {
        flow.ensure(30.0);
        flow.w.text(
            MARGIN,
            flow.y,
            Font::Bold,
            14.0,
            INK,
            &printable(&d.region),
        );
        flow.w.text_right(
            PAGE_WIDTH - MARGIN,
            flow.y,
            Font::Regular,
            14.0,
            INK,
            &format!("{}%", d.percent),
        );
        flow.w.line(
            MARGIN,
            flow.y + 10.0,
            PAGE_WIDTH - MARGIN,
            flow.y + 10.0,
            0.5,
            [230, 230, 230],
        );
        flow.y += 30.0;
    }

    w.text_centered(
        PAGE_HEIGHT - 60.0,
        Font::Italic,
        BODY_SIZE,
        [102, 102, 102],
        "Note: Percentages are AI-generated estimates based on facial analysis.",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Here is a breakdown of the observed traits.

**Comprehensive Ancestry Percentage Breakdown:**
- **West African:** 40%
- **Northern European:** 35%
- **East Asian:** 25%

### SUMMARY TABLE

| Region/Group | Estimated Percentage | Key Traits & Justification |
|--------------|---------------------|---------------------------|
| West African | 40% | Broad nasal bridge |
| Northern European | 35% | Light eye pigmentation |
| East Asian | 25% | Epicanthic folds |

**Conclusion:**
A predominantly West African reading.
";

    #[test]
    fn full_report_renders_all_pages() {
        let report = AnalysisReport::new(REPORT);
        let w = render_report(&report, &RenderOptions::default());
        // cover, analysis, comprehensive, table, conclusion, chart,
        // percentages
        assert_eq!(w.page_count(), 7);
    }

    #[test]
    fn overflowing_paragraph_adds_exactly_one_page() {
        let short = AnalysisReport::new("short paragraph");
        let base = render_report(&short, &RenderOptions::default()).page_count();

        // ~90 wrapped lines at 13pt × 1.6 overflow one content column but
        // fit in two.
        let long = AnalysisReport::new("lorem ipsum dolor sit amet ".repeat(160));
        let paged = render_report(&long, &RenderOptions::default()).page_count();
        assert_eq!(paged, base + 1);
    }

    #[test]
    fn no_wrapped_words_are_dropped() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let lines = wrap_text(text, 120.0, Font::Regular, BODY_SIZE);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn long_words_are_split_not_lost() {
        let word = "x".repeat(200);
        let lines = wrap_text(&word, 100.0, Font::Regular, BODY_SIZE);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn invalid_chart_image_falls_back_to_drawn_pie() {
        let report = AnalysisReport::new(REPORT);
        let opts = RenderOptions {
            user_label: Some("Test Reader"),
            chart_image: Some(&b"not an image"[..]),
        };
        let w = render_report(&report, &opts);
        assert_eq!(w.page_count(), 7);
        let mut buf = Vec::new();
        w.write_to(&mut buf).unwrap();
        assert!(buf.starts_with(b"%PDF"));
    }

    #[test]
    fn valid_chart_image_is_embedded() {
        use image::{DynamicImage, ImageFormat, RgbImage};
        let mut png = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30])))
            .write_to(&mut png, ImageFormat::Png)
            .unwrap();
        let png = png.into_inner();

        let report = AnalysisReport::new(REPORT);
        let opts = RenderOptions {
            user_label: None,
            chart_image: Some(&png),
        };
        let mut buf = Vec::new();
        render_report(&report, &opts).write_to(&mut buf).unwrap();
        assert!(buf.len() > 500);
    }

    #[test]
    fn report_without_data_skips_chart_pages() {
        let report = AnalysisReport::new("plain prose, no percentages anywhere");
        let w = render_report(&report, &RenderOptions::default());
        // cover + analysis only
        assert_eq!(w.page_count(), 2);
    }
}
