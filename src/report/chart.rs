//! Pie-chart geometry and rasterization.
//!
//! Slices start at the top of the circle and sweep clockwise, each covering
//! `percent / sum(percent)` of the full turn. Colors cycle through a fixed
//! 9-color palette by index.

use std::f32::consts::PI;

use image::RgbImage;

use crate::extract::AncestryDatum;
use crate::report::pdf::Rgb;

pub const PALETTE: [Rgb; 9] = [
    [47, 128, 237],  // blue
    [242, 153, 74],  // orange
    [39, 174, 96],   // green
    [235, 87, 87],   // red
    [155, 81, 224],  // purple
    [86, 204, 242],  // sky
    [242, 201, 76],  // yellow
    [111, 207, 151], // mint
    [187, 107, 217], // violet
];

pub fn slice_color(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}

/// One pie slice in screen coordinates (y down): `start` is the angle from
/// the top of the circle, clockwise, in radians.
#[derive(Debug, Clone, Copy)]
pub struct Slice {
    pub start: f32,
    pub sweep: f32,
    pub color: Rgb,
}

/// Proportional sweep angles for the data set, in input order. Empty when
/// the data is empty or sums to zero.
pub fn slices(data: &[AncestryDatum]) -> Vec<Slice> {
    let total: u32 = data.iter().map(|d| d.percent).sum();
    if total == 0 {
        return Vec::new();
    }
    let mut start = 0.0_f32;
    data.iter()
        .enumerate()
        .map(|(i, d)| {
            let sweep = d.percent as f32 / total as f32 * 2.0 * PI;
            let slice = Slice {
                start,
                sweep,
                color: slice_color(i),
            };
            start += sweep;
            slice
        })
        .collect()
}

/// Rasterize the pie onto a white square bitmap. Returns `None` when there
/// is nothing to draw.
pub fn render_pie(data: &[AncestryDatum], size: u32) -> Option<RgbImage> {
    let slices = slices(data);
    if slices.is_empty() || size == 0 {
        return None;
    }

    let mut img = RgbImage::from_pixel(size, size, image::Rgb([255, 255, 255]));
    let center = size as f32 / 2.0;
    let radius = center * 0.92;

    for py in 0..size {
        for px in 0..size {
            let dx = px as f32 + 0.5 - center;
            let dy = py as f32 + 0.5 - center;
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            // Angle from the top, clockwise, in [0, 2π).
            let mut theta = dx.atan2(-dy);
            if theta < 0.0 {
                theta += 2.0 * PI;
            }
            let color = slices
                .iter()
                .find(|s| theta >= s.start && theta < s.start + s.sweep)
                .map(|s| s.color)
                .unwrap_or_else(|| slices[slices.len() - 1].color);
            img.put_pixel(px, py, image::Rgb(color));
        }
    }
    Some(img)
}
