//! Minimal multi-page PDF writer.
//!
//! Wraps `lopdf` with a top-down coordinate system (y grows downward, like
//! the layout code thinks) and the three standard Helvetica faces. Pages are
//! recorded as operation lists and assembled into a document on save.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use thiserror::Error;

pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("pdf encoding failed: {0}")]
    Encode(#[from] lopdf::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Standard one-byte-encoded faces; no font embedding needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
        }
    }

    fn base_name(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Italic => "Helvetica-Oblique",
        }
    }

    /// Average glyph width as a fraction of the font size, for wrapping
    /// estimates.
    pub fn width_factor(self) -> f32 {
        match self {
            Font::Bold => 0.54,
            _ => 0.50,
        }
    }

    /// Estimated rendered width of `text` at `size` points.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * self.width_factor()
    }
}

pub type Rgb = [u8; 3];

fn real(v: f32) -> Object {
    Object::Real(v.into())
}

fn color_ops(color: Rgb) -> Vec<Object> {
    color
        .iter()
        .map(|&c| real(f32::from(c) / 255.0))
        .collect()
}

struct RawImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

/// Records drawing operations per page; `save`/`write_to` assemble the
/// final document.
pub struct PdfWriter {
    pages: Vec<Vec<Operation>>,
    images: Vec<RawImage>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            images: Vec::new(),
        }
    }

    pub fn new_page(&mut self) {
        self.pages.push(Vec::new());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        self.pages.last_mut().expect("writer always has a page")
    }

    /// Place a single line of text with its baseline at top-down `y`.
    pub fn text(&mut self, x: f32, y: f32, font: Font, size: f32, color: Rgb, text: &str) {
        let y = PAGE_HEIGHT - y;
        let ops = self.ops();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![font.resource().into(), real(size)],
        ));
        ops.push(Operation::new("rg", color_ops(color)));
        ops.push(Operation::new("Td", vec![real(x), real(y)]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        ops.push(Operation::new("ET", vec![]));
    }

    /// Text centered on the page's horizontal midline.
    pub fn text_centered(&mut self, y: f32, font: Font, size: f32, color: Rgb, text: &str) {
        let x = (PAGE_WIDTH - font.text_width(text, size)) / 2.0;
        self.text(x.max(0.0), y, font, size, color, text);
    }

    /// Text with its right edge at `right_x`.
    pub fn text_right(&mut self, right_x: f32, y: f32, font: Font, size: f32, color: Rgb, text: &str) {
        let x = right_x - font.text_width(text, size);
        self.text(x.max(0.0), y, font, size, color, text);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        let y = PAGE_HEIGHT - y - h;
        let ops = self.ops();
        ops.push(Operation::new("rg", color_ops(color)));
        ops.push(Operation::new("re", vec![real(x), real(y), real(w), real(h)]));
        ops.push(Operation::new("f", vec![]));
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Rgb) {
        let ops_color = color_ops(color);
        let ops = self.ops();
        ops.push(Operation::new("RG", ops_color));
        ops.push(Operation::new("w", vec![real(width)]));
        ops.push(Operation::new("m", vec![real(x1), real(PAGE_HEIGHT - y1)]));
        ops.push(Operation::new("l", vec![real(x2), real(PAGE_HEIGHT - y2)]));
        ops.push(Operation::new("S", vec![]));
    }

    /// Filled triangle, used as the fan primitive for pie slices.
    pub fn fill_triangle(&mut self, points: [(f32, f32); 3], color: Rgb) {
        let ops_color = color_ops(color);
        let ops = self.ops();
        ops.push(Operation::new("rg", ops_color));
        let (x0, y0) = points[0];
        ops.push(Operation::new("m", vec![real(x0), real(PAGE_HEIGHT - y0)]));
        for &(x, y) in &points[1..] {
            ops.push(Operation::new("l", vec![real(x), real(PAGE_HEIGHT - y)]));
        }
        ops.push(Operation::new("f", vec![]));
    }

    /// Register a raw 8-bit RGB bitmap; returns a handle for `draw_image`.
    pub fn add_image(&mut self, width: u32, height: u32, rgb: Vec<u8>) -> usize {
        self.images.push(RawImage { width, height, rgb });
        self.images.len() - 1
    }

    /// Paint a registered image with its top-left corner at (`x`, `y`).
    pub fn draw_image(&mut self, handle: usize, x: f32, y: f32, w: f32, h: f32) {
        let y = PAGE_HEIGHT - y - h;
        let name = format!("Im{handle}");
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![real(w), real(0.0), real(0.0), real(h), real(x), real(y)],
        ));
        ops.push(Operation::new("Do", vec![name.as_str().into()]));
        ops.push(Operation::new("Q", vec![]));
    }

    fn build(self) -> Result<Document, PdfError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut font_dict = Dictionary::new();
        for font in [Font::Regular, Font::Bold, Font::Italic] {
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_name(),
            });
            font_dict.set(font.resource(), id);
        }

        let mut xobject_dict = Dictionary::new();
        for (i, img) in self.images.into_iter().enumerate() {
            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(img.width),
                    "Height" => i64::from(img.height),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                img.rgb,
            );
            let id = doc.add_object(stream);
            xobject_dict.set(format!("Im{i}"), id);
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => font_dict,
            "XObject" => xobject_dict,
        });

        let mut kids: Vec<Object> = Vec::new();
        let page_total = self.pages.len();
        for ops in self.pages {
            let content = Content { operations: ops };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_total as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), real(PAGE_WIDTH), real(PAGE_HEIGHT)],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();
        Ok(doc)
    }

    pub fn write_to<W: Write>(self, target: &mut W) -> Result<(), PdfError> {
        let mut doc = self.build()?;
        doc.save_to(target)?;
        Ok(())
    }

    pub fn save(self, path: &Path) -> Result<(), PdfError> {
        let mut file = File::create(path)?;
        self.write_to(&mut file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_accumulate() {
        let mut w = PdfWriter::new();
        assert_eq!(w.page_count(), 1);
        w.text(40.0, 60.0, Font::Bold, 15.0, [35, 37, 43], "Title");
        w.new_page();
        w.fill_rect(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT, [252, 252, 255]);
        assert_eq!(w.page_count(), 2);
    }

    #[test]
    fn document_serializes() {
        let mut w = PdfWriter::new();
        w.text(40.0, 60.0, Font::Regular, 13.0, [0, 0, 0], "hello");
        let img = w.add_image(2, 2, vec![255; 12]);
        w.draw_image(img, 100.0, 100.0, 50.0, 50.0);
        let mut buf = Vec::new();
        w.write_to(&mut buf).unwrap();
        assert!(buf.starts_with(b"%PDF-1.5"));
        assert!(buf.len() > 200);
    }

    #[test]
    fn width_estimate_scales_with_text() {
        let short = Font::Regular.text_width("abc", 13.0);
        let long = Font::Regular.text_width("abcdef", 13.0);
        assert!(long > short);
    }
}
