//! Drawing surface used by the layout engine
//!
//! Coordinates are millimetres from the top-left corner of the page; text
//! `y` is the baseline. Backends translate to their own coordinate space.

use serde::Serialize;

use crate::images::DecodedImage;
use crate::measure::FontStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GREY: Rgb = Rgb::new(110, 110, 110);
    pub const RULE: Rgb = Rgb::new(200, 200, 200);
    pub const SHADE: Rgb = Rgb::new(240, 240, 240);
    pub const ERROR: Rgb = Rgb::new(180, 30, 30);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `#rgb`
    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    /// Channels scaled to 0.0..=1.0
    pub fn unit(&self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

pub trait Canvas {
    /// Page width and height in millimetres
    fn page_size(&self) -> (f32, f32);

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, style: FontStyle, color: Rgb);

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Rgb);

    /// Filled rectangle with its top-left corner at `(x, y)`
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb);

    /// Image with its top-left corner at `(x, y)` scaled to `width` x `height`
    fn draw_image(&mut self, image: &DecodedImage, x: f32, y: f32, width: f32, height: f32);

    fn new_page(&mut self);
}

/// A single recorded drawing call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        color: Rgb,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        thickness: f32,
        color: Rgb,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        width_px: u32,
        height_px: u32,
    },
}

/// Canvas that keeps every drawing call, grouped by page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingCanvas {
    width: f32,
    height: f32,
    pages: Vec<Vec<DrawOp>>,
}

impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            pages: vec![Vec::new()],
        }
    }

    pub fn pages(&self) -> &[Vec<DrawOp>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text drawn on a page, in drawing order
    pub fn texts_on(&self, page: usize) -> Vec<&str> {
        self.pages
            .get(page)
            .into_iter()
            .flatten()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Index of the first page carrying `needle` in any text
    pub fn find_text(&self, needle: &str) -> Option<usize> {
        (0..self.pages.len()).find(|&page| self.texts_on(page).iter().any(|t| t.contains(needle)))
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }
}

impl Canvas for RecordingCanvas {
    fn page_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, style: FontStyle, color: Rgb) {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            size,
            style,
            color,
        });
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Rgb) {
        self.push(DrawOp::Line {
            from,
            to,
            thickness,
            color,
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn draw_image(&mut self, image: &DecodedImage, x: f32, y: f32, width: f32, height: f32) {
        self.push(DrawOp::Image {
            x,
            y,
            width,
            height,
            width_px: image.width_px,
            height_px: image.height_px,
        });
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
    }
}
