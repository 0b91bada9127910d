//! Drawing instructions emitted by the worksheet builder.
//!
//! Coordinates are top-left based points. Nothing here knows about PDF; the
//! backend in `render::pdf` is the only consumer that touches the document.

use std::path::PathBuf;

use serde::Serialize;

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GREY: Color = Color::rgb(128, 128, 128);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const TITLE_BOX: Color = Color::rgb(0x73, 0x73, 0x73);
    pub const TITLE_GREEN: Color = Color::rgb(0x2a, 0xcf, 0x90);
    pub const HEADING_PURPLE: Color = Color::rgb(0x98, 0x2c, 0xc9);

    /// Components scaled to `0.0..=1.0`.
    pub fn unit(&self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

/// The built-in faces every PDF viewer ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontFace {
    Regular,
    Bold,
    Oblique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f32,
    pub color: Color,
    pub align: Align,
    /// Box width used for centre/right alignment. `None` means left-aligned at `x`.
    pub width: Option<f32>,
    /// Extra space after every character, in points.
    pub letter_spacing: f32,
}

impl TextStyle {
    pub fn new(face: FontFace, size: f32) -> Self {
        TextStyle {
            face,
            size,
            color: Color::BLACK,
            align: Align::Left,
            width: None,
            letter_spacing: 0.0,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: Align, width: f32) -> Self {
        self.align = align;
        self.width = Some(width);
        self
    }

    pub fn letter_spacing(mut self, spacing: f32) -> Self {
        self.letter_spacing = spacing;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub const fn new(color: Color, width: f32) -> Self {
        Stroke { color, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PathSegment {
    LineTo { x: f32, y: f32 },
    /// Quadratic Bézier through control point `(cx, cy)`.
    QuadTo { cx: f32, cy: f32, x: f32, y: f32 },
}

// ────────────────────────────────────────────────────────────────────────────
// Commands
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RenderCommand {
    /// `y` is the top of the line box, not the baseline.
    Text {
        text: String,
        x: f32,
        y: f32,
        style: TextStyle,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        stroke: Stroke,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        stroke: Stroke,
    },
    RoundedRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        stroke: Stroke,
    },
    Path {
        start: (f32, f32),
        segments: Vec<PathSegment>,
        stroke: Stroke,
    },
    /// A missing dimension is derived from the image's aspect ratio.
    Image {
        path: PathBuf,
        x: f32,
        y: f32,
        width: Option<f32>,
        height: Option<f32>,
    },
    PageBreak,
}

/// Splits a flat command list into pages at each `PageBreak`.
pub fn split_pages(commands: &[RenderCommand]) -> Vec<&[RenderCommand]> {
    commands
        .split(|c| matches!(c, RenderCommand::PageBreak))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Canvas
// ────────────────────────────────────────────────────────────────────────────

/// Records commands page by page. Earlier pages stay editable until
/// `into_commands`, so page numbers can be stamped once the total is known.
#[derive(Debug, Clone)]
pub struct Canvas {
    pages: Vec<Vec<RenderCommand>>,
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas {
            pages: vec![Vec::new()],
        }
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: RenderCommand) {
        if let Some(page) = self.pages.last_mut() {
            page.push(command);
        }
    }

    pub fn text(&mut self, text: impl Into<String>, x: f32, y: f32, style: TextStyle) {
        self.push(RenderCommand::Text {
            text: text.into(),
            x,
            y,
            style,
        });
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: Stroke) {
        self.push(RenderCommand::Line { from, to, stroke });
    }

    pub fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Appends commands to every page; `f` receives the 1-based page number and the total.
    pub fn stamp_pages<F>(&mut self, f: F)
    where
        F: Fn(usize, usize) -> Vec<RenderCommand>,
    {
        let total = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.extend(f(i + 1, total));
        }
    }

    /// Flattens pages into one list separated by `PageBreak`.
    pub fn into_commands(self) -> Vec<RenderCommand> {
        let mut out = Vec::new();
        for (i, page) in self.pages.into_iter().enumerate() {
            if i > 0 {
                out.push(RenderCommand::PageBreak);
            }
            out.extend(page);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> RenderCommand {
        RenderCommand::Text {
            text: s.to_string(),
            x: 0.0,
            y: 0.0,
            style: TextStyle::new(FontFace::Regular, 12.0),
        }
    }

    #[test]
    fn test_canvas_flattens_with_page_breaks() {
        let mut canvas = Canvas::new();
        canvas.push(label("a"));
        canvas.add_page();
        canvas.push(label("b"));
        let commands = canvas.into_commands();
        assert_eq!(commands, vec![label("a"), RenderCommand::PageBreak, label("b")]);
        assert_eq!(split_pages(&commands).len(), 2);
    }

    #[test]
    fn test_stamp_pages_sees_total() {
        let mut canvas = Canvas::new();
        canvas.add_page();
        canvas.add_page();
        canvas.stamp_pages(|page, total| vec![label(&format!("p. {page}/{total}"))]);
        let commands = canvas.into_commands();
        let pages = split_pages(&commands);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2], &[label("p. 3/3")][..]);
    }

    #[test]
    fn test_color_unit_scale() {
        assert_eq!(Color::BLACK.unit(), [0.0, 0.0, 0.0]);
        assert_eq!(Color::rgb(255, 255, 255).unit(), [1.0, 1.0, 1.0]);
    }
}
