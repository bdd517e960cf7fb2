//! Panels for the three phases, plus the result carousel.
//!
//! The widgets themselves (progress bar, grid, painter shapes) are stock
//! egui; everything interesting — what text lands on which card — comes
//! from the extract module, recomputed from the raw analysis each frame.

use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Color32, RichText};
use log::warn;

use super::RootlensApp;
use crate::extract::percent::parse_table_lines;
use crate::extract::{normalize::normalize, AncestryDatum, AnalysisReport};
use crate::report::chart::{slice_color, slices};
use crate::report::document::{save_report, RenderOptions};

const ACCENT: Color32 = Color32::from_rgb(47, 128, 237);
const CARD_TITLES: [&str; 4] = [
    "Your Ancestry Reading",
    "More Details",
    "Summary Table",
    "Ancestry Pie Chart",
];

pub fn upload_panel(app: &mut RootlensApp, ctx: &egui::Context) {
    // Drag & drop counts as picking, with the same in-flight gate.
    let dropped = ctx.input(|i| {
        i.raw
            .dropped_files
            .first()
            .and_then(|f| f.path.clone())
    });
    if let Some(path) = dropped {
        app.pick_photo(path);
    }

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading(RichText::new("Rootlens").size(30.0).strong());
            ui.label("Upload a clear photo of your face to get a playful, experimental ancestry breakdown.");
            ui.add_space(16.0);

            if let Some(texture) = &app.preview {
                ui.image((texture.id(), egui::vec2(220.0, 220.0)));
                ui.add_space(8.0);
            }
            if let Some(picked) = &app.picked {
                ui.label(
                    RichText::new(format!("File ready: {} ({})", picked.name, picked.size_label))
                        .color(ACCENT),
                );
            } else {
                ui.label(RichText::new("PNG, JPG, WEBP, GIF up to 20 MB").weak());
            }
            ui.add_space(12.0);

            if ui.button("Choose Photo…").clicked() {
                let file = rfd::FileDialog::new()
                    .add_filter("images", &["png", "jpg", "jpeg", "webp", "gif"])
                    .pick_file();
                if let Some(path) = file {
                    app.pick_photo(path);
                }
            }

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 6.0;
                ui.add_space(ui.available_width() / 2.0 - 120.0);
                ui.label("Name on the report (optional):");
                ui.add(egui::TextEdit::singleline(&mut app.user_name).desired_width(140.0));
            });
            ui.add_space(12.0);

            let ready = app.picked.is_some();
            if ui
                .add_enabled(ready, egui::Button::new(RichText::new("Reveal my roots").strong()))
                .clicked()
            {
                app.start_analysis(ctx);
            }

            if let Some(error) = app.session.error() {
                ui.add_space(12.0);
                ui.colored_label(Color32::from_rgb(235, 87, 87), error);
            }
        });
    });
}

pub fn processing_panel(app: &mut RootlensApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.heading(RichText::new("Analyzing Image…").color(ACCENT));
            ui.add_space(24.0);

            let progress = app.session.progress();
            ui.add(
                egui::ProgressBar::new(f32::from(progress) / 100.0)
                    .desired_width(320.0)
                    .text(format!("{progress}%")),
            );
            ui.add_space(16.0);
            ui.label(RichText::new("Please wait while we analyze your image for ancestry features.").weak());
        });
    });
}

pub fn result_panel(app: &mut RootlensApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let Some(outcome) = app.outcome.clone() else {
            ui.label("Upload an image to see your ancestry analysis here.");
            return;
        };
        let report = AnalysisReport::new(outcome.analysis.clone());
        let data = if outcome.ancestry_data.is_empty() {
            report.ancestry()
        } else {
            outcome.ancestry_data.clone()
        };

        ui.vertical_centered(|ui| {
            ui.add_space(16.0);
            ui.heading(RichText::new(CARD_TITLES[app.carousel]).color(ACCENT));
            ui.add_space(8.0);
        });

        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 90.0)
            .show(ui, |ui| match app.carousel {
                0 => reading_card(ui, &report),
                1 => details_card(ui, &report),
                2 => table_card(ui, &report),
                _ => chart_card(ui, &data),
            });

        ui.add_space(8.0);
        carousel_dots(app, ui);
        ui.add_space(8.0);
        action_row(app, ui, &report, &data);
    });
}

fn reading_card(ui: &mut egui::Ui, report: &AnalysisReport) {
    let highlights = report.feature_highlights();
    if highlights.is_empty() {
        ui.label(RichText::new("No specific features highlighted.").weak());
    } else {
        for line in highlights.iter().take(8) {
            ui.horizontal_wrapped(|ui| {
                ui.label("\u{2022}");
                ui.label(line);
            });
        }
    }
    ui.separator();
    for para in &report.sections().analysis {
        ui.label(normalize(para));
        ui.add_space(8.0);
    }
}

fn details_card(ui: &mut egui::Ui, report: &AnalysisReport) {
    let sections = report.sections();
    for line in &sections.comprehensive {
        ui.label(normalize(line));
        ui.add_space(4.0);
    }
    if !sections.conclusion.is_empty() {
        ui.separator();
        for line in &sections.conclusion {
            ui.label(normalize(line));
        }
    }
}

fn table_card(ui: &mut egui::Ui, report: &AnalysisReport) {
    let Some(table) = parse_table_lines(&report.sections().table_lines) else {
        ui.label(RichText::new("No summary table in this reading.").weak());
        return;
    };
    egui::Grid::new("summary-table")
        .striped(true)
        .spacing([24.0, 8.0])
        .show(ui, |ui| {
            for cell in &table.header {
                ui.label(RichText::new(normalize(cell)).strong());
            }
            ui.end_row();
            for row in &table.rows {
                for cell in row {
                    ui.label(normalize(cell));
                }
                ui.end_row();
            }
        });
}

fn chart_card(ui: &mut egui::Ui, data: &[AncestryDatum]) {
    if data.is_empty() {
        ui.label(RichText::new("No ancestry data available for visualization.").weak());
        return;
    }
    ui.vertical_centered(|ui| {
        draw_pie(ui, data);
        ui.add_space(12.0);
        for (i, d) in data.iter().enumerate() {
            let [r, g, b] = slice_color(i);
            ui.horizontal(|ui| {
                ui.add_space(ui.available_width() / 2.0 - 90.0);
                ui.colored_label(Color32::from_rgb(r, g, b), "\u{25a0}");
                ui.label(format!("{}: {}%", d.region, d.percent));
            });
        }
    });
}

/// Stock egui painter pie: one convex fan polygon per slice, white seams.
fn draw_pie(ui: &mut egui::Ui, data: &[AncestryDatum]) {
    let (response, painter) = ui.allocate_painter(egui::vec2(260.0, 260.0), egui::Sense::hover());
    let center = response.rect.center();
    let radius = 115.0;

    for slice in slices(data) {
        let mut points = vec![center];
        let segments = ((slice.sweep / TAU * 64.0) as usize).max(2);
        for i in 0..=segments {
            let angle = slice.start + slice.sweep * i as f32 / segments as f32 - FRAC_PI_2;
            points.push(center + radius * egui::vec2(angle.cos(), angle.sin()));
        }
        let [r, g, b] = slice.color;
        painter.add(egui::Shape::convex_polygon(
            points,
            Color32::from_rgb(r, g, b),
            egui::Stroke::new(1.0, Color32::WHITE),
        ));
    }
}

fn carousel_dots(app: &mut RootlensApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.add_space(ui.available_width() / 2.0 - 60.0);
        if ui.button("\u{2190}").clicked() && app.carousel > 0 {
            app.carousel -= 1;
        }
        for i in 0..CARD_TITLES.len() {
            let dot = if i == app.carousel { "\u{25cf}" } else { "\u{25cb}" };
            if ui.selectable_label(i == app.carousel, dot).clicked() {
                app.carousel = i;
            }
        }
        if ui.button("\u{2192}").clicked() && app.carousel + 1 < CARD_TITLES.len() {
            app.carousel += 1;
        }
    });
}

fn action_row(
    app: &mut RootlensApp,
    ui: &mut egui::Ui,
    report: &AnalysisReport,
    data: &[AncestryDatum],
) {
    ui.horizontal(|ui| {
        ui.add_space(ui.available_width() / 2.0 - 180.0);

        if ui.button("Download TXT").clicked() {
            let file = rfd::FileDialog::new()
                .set_file_name("ancestry-analysis.txt")
                .save_file();
            if let Some(path) = file {
                if let Err(e) = std::fs::write(&path, report.raw()) {
                    warn!("text export failed: {e}");
                }
            }
        }

        if ui.button("Download PDF").clicked() {
            let file = rfd::FileDialog::new()
                .set_file_name("ancestry-analysis-report.pdf")
                .save_file();
            if let Some(path) = file {
                let chart_png = rendered_chart_png(data);
                let opts = RenderOptions {
                    user_label: (!app.user_name.trim().is_empty())
                        .then_some(app.user_name.trim()),
                    chart_image: chart_png.as_deref(),
                };
                if let Err(e) = save_report(report, &opts, &path) {
                    warn!("pdf export failed: {e}");
                }
            }
        }

        if ui.button("Share").clicked() {
            let text = "I just discovered my ancestry using this new AI app!";
            let encoded: String = url::form_urlencoded::byte_serialize(text.as_bytes()).collect();
            let share = format!("https://twitter.com/intent/tweet?text={encoded}");
            if let Err(e) = open::that(share) {
                warn!("could not open share link: {e}");
            }
        }

        if ui.button("New Reading").clicked() {
            app.new_reading();
        }
    });
}

/// Rasterize the pie for PDF embedding; the renderer falls back to its own
/// drawing when this returns None.
fn rendered_chart_png(data: &[AncestryDatum]) -> Option<Vec<u8>> {
    let img = crate::report::chart::render_pie(data, 700)?;
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| warn!("chart rasterization failed: {e}"))
        .ok()?;
    Some(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::session::GENERIC_FAILURE;

    #[test]
    fn chart_png_roundtrips_through_the_decoder() {
        let data = vec![
            AncestryDatum {
                region: "A".into(),
                percent: 60,
            },
            AncestryDatum {
                region: "B".into(),
                percent: 40,
            },
        ];
        let png = rendered_chart_png(&data).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 700);
    }

    #[test]
    fn no_data_means_no_chart_png() {
        assert!(rendered_chart_png(&[]).is_none());
    }

    #[test]
    fn generic_failure_is_the_only_user_facing_error() {
        assert!(GENERIC_FAILURE.contains("try again"));
    }
}
