//! PDF backend: encodes `RenderCommand`s into a PDF file with lopdf.
//!
//! Text uses the standard Type1 Helvetica faces with WinAnsi encoding, so no
//! font files are embedded. Images are decoded with `image` and embedded as
//! RGB XObjects with an alpha soft mask; each path is embedded once per
//! document no matter how many pages use it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;
use tracing::warn;

use crate::drill::layout::PageGeometry;
use crate::render::commands::{
    split_pages, Align, FontFace, PathSegment, RenderCommand, Stroke, TextStyle,
};
use crate::render::font_metrics::{text_width, ASCENDER};

/// Bézier circle approximation constant.
const KAPPA: f32 = 0.552_284_8;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to encode page content: {0}")]
    Encode(String),

    #[error("Failed to serialize PDF: {0}")]
    Save(String),
}

/// Document metadata written to the trailer's Info dictionary.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub subject: String,
}

/// Encodes `commands` as a PDF. Each `PageBreak` starts a new page.
pub fn render_pdf(
    commands: &[RenderCommand],
    geometry: &PageGeometry,
    info: &DocumentInfo,
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in [FontFace::Regular, FontFace::Bold, FontFace::Oblique] {
        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(base_font(face).as_bytes().to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]));
        fonts.set(font_key(face), Object::Reference(font_id));
    }

    let mut images = ImageCache::default();
    let mut page_ids = Vec::new();

    for page in split_pages(commands) {
        let mut painter = Painter {
            page_height: geometry.height,
            ops: Vec::new(),
        };
        for command in page {
            painter.draw(command, &mut doc, &mut images);
        }

        let content = Content {
            operations: painter.ops,
        };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    real(geometry.width),
                    real(geometry.height),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Reference(resources_id)),
        ]));
        page_ids.push(page_id);
    }

    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    resources.set("XObject", Object::Dictionary(images.resource_dictionary()));
    doc.objects.insert(resources_id, resources.into());

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_ids.len() as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let created = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
    let info_id = doc.add_object(Dictionary::from_iter(vec![
        ("Title", literal(&info.title)),
        ("Subject", literal(&info.subject)),
        ("Producer", literal(concat!("mathdrill ", env!("CARGO_PKG_VERSION")))),
        ("CreationDate", literal(&created)),
    ]));
    doc.trailer.set("Info", Object::Reference(info_id));

    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RenderError::Save(e.to_string()))?;
    Ok(buffer)
}

// ────────────────────────────────────────────────────────────────────────────
// Page painter
// ────────────────────────────────────────────────────────────────────────────

struct Painter {
    page_height: f32,
    ops: Vec<Operation>,
}

impl Painter {
    /// Converts a top-left based y coordinate to PDF user space.
    fn flip(&self, y: f32) -> f32 {
        self.page_height - y
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    fn draw(&mut self, command: &RenderCommand, doc: &mut Document, images: &mut ImageCache) {
        match command {
            RenderCommand::Text { text, x, y, style } => self.text(text, *x, *y, style),
            RenderCommand::Line { from, to, stroke } => {
                self.set_stroke(stroke);
                self.move_to(from.0, from.1);
                self.line_to(to.0, to.1);
                self.op("S", vec![]);
            }
            RenderCommand::Rect {
                x,
                y,
                width,
                height,
                stroke,
            } => {
                self.set_stroke(stroke);
                self.op(
                    "re",
                    vec![
                        real(*x),
                        real(self.flip(y + height)),
                        real(*width),
                        real(*height),
                    ],
                );
                self.op("S", vec![]);
            }
            RenderCommand::RoundedRect {
                x,
                y,
                width,
                height,
                radius,
                stroke,
            } => {
                self.set_stroke(stroke);
                self.rounded_rect(*x, *y, *width, *height, *radius);
                self.op("S", vec![]);
            }
            RenderCommand::Path {
                start,
                segments,
                stroke,
            } => {
                self.set_stroke(stroke);
                self.path(*start, segments);
                self.op("S", vec![]);
            }
            RenderCommand::Image {
                path,
                x,
                y,
                width,
                height,
            } => {
                if let Some(image) = images.get_or_embed(doc, path) {
                    let (w, h) = image.fit(*width, *height);
                    let name = image.name.clone();
                    self.op("q", vec![]);
                    self.op(
                        "cm",
                        vec![
                            real(w),
                            real(0.0),
                            real(0.0),
                            real(h),
                            real(*x),
                            real(self.flip(y + h)),
                        ],
                    );
                    self.op("Do", vec![Object::Name(name.into_bytes())]);
                    self.op("Q", vec![]);
                }
            }
            RenderCommand::PageBreak => {}
        }
    }

    fn text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        let measured = text_width(text, style.face, style.size, style.letter_spacing);
        let x = match (style.align, style.width) {
            (Align::Center, Some(box_width)) => x + (box_width - measured) / 2.0,
            (Align::Right, Some(box_width)) => x + box_width - measured,
            _ => x,
        };
        let baseline = self.flip(y + ASCENDER * style.size);
        let [r, g, b] = style.color.unit();

        self.op("BT", vec![]);
        self.op(
            "Tf",
            vec![
                Object::Name(font_key(style.face).as_bytes().to_vec()),
                real(style.size),
            ],
        );
        self.op("rg", vec![real(r), real(g), real(b)]);
        self.op("Tc", vec![real(style.letter_spacing)]);
        self.op("Td", vec![real(x), real(baseline)]);
        self.op(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
    }

    fn set_stroke(&mut self, stroke: &Stroke) {
        let [r, g, b] = stroke.color.unit();
        self.op("RG", vec![real(r), real(g), real(b)]);
        self.op("w", vec![real(stroke.width)]);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let y = self.flip(y);
        self.op("m", vec![real(x), real(y)]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let y = self.flip(y);
        self.op("l", vec![real(x), real(y)]);
    }

    /// Cubic Bézier with all points in top-left coordinates.
    fn curve_to(&mut self, c1: (f32, f32), c2: (f32, f32), end: (f32, f32)) {
        let operands = vec![
            real(c1.0),
            real(self.flip(c1.1)),
            real(c2.0),
            real(self.flip(c2.1)),
            real(end.0),
            real(self.flip(end.1)),
        ];
        self.op("c", operands);
    }

    fn path(&mut self, start: (f32, f32), segments: &[PathSegment]) {
        self.move_to(start.0, start.1);
        let mut current = start;
        for segment in segments {
            match *segment {
                PathSegment::LineTo { x, y } => {
                    self.line_to(x, y);
                    current = (x, y);
                }
                PathSegment::QuadTo { cx, cy, x, y } => {
                    let (c1, c2) = quad_to_cubic(current, (cx, cy), (x, y));
                    self.curve_to(c1, c2, (x, y));
                    current = (x, y);
                }
            }
        }
    }

    fn rounded_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        let r = radius.clamp(0.0, width.min(height) / 2.0);
        let k = r * KAPPA;
        let (left, top, right, bottom) = (x, y, x + width, y + height);

        self.move_to(left + r, top);
        self.line_to(right - r, top);
        self.curve_to((right - r + k, top), (right, top + r - k), (right, top + r));
        self.line_to(right, bottom - r);
        self.curve_to(
            (right, bottom - r + k),
            (right - r + k, bottom),
            (right - r, bottom),
        );
        self.line_to(left + r, bottom);
        self.curve_to(
            (left + r - k, bottom),
            (left, bottom - r + k),
            (left, bottom - r),
        );
        self.line_to(left, top + r);
        self.curve_to((left, top + r - k), (left + r - k, top), (left + r, top));
        self.op("h", vec![]);
    }
}

/// Control points of the cubic equivalent to a quadratic Bézier.
fn quad_to_cubic(
    start: (f32, f32),
    control: (f32, f32),
    end: (f32, f32),
) -> ((f32, f32), (f32, f32)) {
    let c1 = (
        start.0 + 2.0 / 3.0 * (control.0 - start.0),
        start.1 + 2.0 / 3.0 * (control.1 - start.1),
    );
    let c2 = (
        end.0 + 2.0 / 3.0 * (control.0 - end.0),
        end.1 + 2.0 / 3.0 * (control.1 - end.1),
    );
    (c1, c2)
}

// ────────────────────────────────────────────────────────────────────────────
// Images
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct EmbeddedImage {
    name: String,
    id: ObjectId,
    pixel_width: u32,
    pixel_height: u32,
}

impl EmbeddedImage {
    /// Display size in points, preserving aspect ratio for a missing dimension.
    fn fit(&self, width: Option<f32>, height: Option<f32>) -> (f32, f32) {
        let (pw, ph) = (self.pixel_width as f32, self.pixel_height as f32);
        match (width, height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, w * ph / pw),
            (None, Some(h)) => (h * pw / ph, h),
            (None, None) => (pw, ph),
        }
    }
}

/// Embedded images keyed by source path. Failed loads are remembered as `None`
/// so a broken file is reported once per document.
#[derive(Default)]
struct ImageCache {
    entries: HashMap<PathBuf, Option<EmbeddedImage>>,
}

impl ImageCache {
    fn get_or_embed(&mut self, doc: &mut Document, path: &Path) -> Option<EmbeddedImage> {
        if let Some(entry) = self.entries.get(path) {
            return entry.clone();
        }
        let name = format!("Im{}", self.entries.len() + 1);
        let embedded = match embed_image(doc, path, name) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Skipping image {}: {e}", path.display());
                None
            }
        };
        self.entries.insert(path.to_path_buf(), embedded.clone());
        embedded
    }

    fn resource_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        for image in self.entries.values().flatten() {
            dict.set(image.name.as_bytes().to_vec(), Object::Reference(image.id));
        }
        dict
    }
}

fn embed_image(
    doc: &mut Document,
    path: &Path,
    name: String,
) -> Result<EmbeddedImage, image::ImageError> {
    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixel_count = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let mask_id = doc.add_object(Stream::new(
        image_dictionary(width, height, b"DeviceGray"),
        alpha,
    ));
    let mut dict = image_dictionary(width, height, b"DeviceRGB");
    dict.set("SMask", Object::Reference(mask_id));
    let id = doc.add_object(Stream::new(dict, rgb));

    Ok(EmbeddedImage {
        name,
        id,
        pixel_width: width,
        pixel_height: height,
    })
}

fn image_dictionary(width: u32, height: u32, color_space: &[u8]) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(i64::from(width))),
        ("Height", Object::Integer(i64::from(height))),
        ("ColorSpace", Object::Name(color_space.to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ])
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

fn literal(text: &str) -> Object {
    Object::String(encode_win_ansi(text), StringFormat::Literal)
}

fn base_font(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "Helvetica",
        FontFace::Bold => "Helvetica-Bold",
        FontFace::Oblique => "Helvetica-Oblique",
    }
}

fn font_key(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "F1",
        FontFace::Bold => "F2",
        FontFace::Oblique => "F3",
    }
}

/// Maps text to WinAnsi bytes. Latin-1 passes through; the typographic minus
/// becomes a hyphen and anything else unsupported becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2212}' => b'-',
            c if (c as u32) < 0x80 => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}
