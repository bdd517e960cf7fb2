//! Report rendering — the multi-page PDF export and the pie-chart raster.
//!
//! - `pdf`      — a small page writer over `lopdf` (text, rules, fills,
//!   raw-RGB image embedding)
//! - `chart`    — the 9-color palette, slice geometry, and a PNG rasterizer
//! - `document` — lays the extracted report out onto A4 pages

pub mod chart;
pub mod document;
pub mod pdf;
