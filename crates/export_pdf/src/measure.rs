//! Text measurement and wrapping for the builtin PDF fonts
//!
//! Advance widths come from the Adobe font metrics of Helvetica and
//! Helvetica-Bold (1/1000 em, printable ASCII). Courier is fixed-pitch.

use serde::Serialize;

use crate::geometry::PT_TO_MM;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Regular,
    Bold,
    Mono,
}

/// Line spacing as a multiple of the font size
const LEADING: f32 = 1.3;

/// Width used for characters outside the tables
const DEFAULT_WIDTH: u16 = 556;

const COURIER_WIDTH: u16 = 600;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

fn char_units(c: char, style: FontStyle) -> u16 {
    let table = match style {
        FontStyle::Mono => return COURIER_WIDTH,
        FontStyle::Regular => &HELVETICA,
        FontStyle::Bold => &HELVETICA_BOLD,
    };
    match c as u32 {
        code @ 32..=126 => table[(code - 32) as usize],
        _ => DEFAULT_WIDTH,
    }
}

/// Rendered width of `text` in millimetres
pub fn text_width(text: &str, size: f32, style: FontStyle) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_units(c, style))).sum();
    units as f32 / 1000.0 * size * PT_TO_MM
}

/// Baseline-to-baseline distance in millimetres
pub fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * LEADING
}

/// Wraps text to `max_width` millimetres. Breaks on whitespace, keeps
/// explicit newlines, and hard-breaks words wider than the column. Always
/// returns at least one line.
pub fn wrap_text(text: &str, max_width: f32, size: f32, style: FontStyle) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph.trim_end_matches('\r'), max_width, size, style, &mut lines);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_paragraph(paragraph: &str, max_width: f32, size: f32, style: FontStyle, lines: &mut Vec<String>) {
    let mut current = String::new();
    for word in paragraph.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, size, style) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, size, style) <= max_width {
            current = word.to_string();
        } else {
            for piece in hard_break(word, max_width, size, style) {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = piece;
            }
        }
    }
    lines.push(current);
}

/// Splits a single word into chunks no wider than `max_width` (at least one
/// character per chunk)
fn hard_break(word: &str, max_width: f32, size: f32, style: FontStyle) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if current.chars().count() > 1 && text_width(&current, size, style) > max_width {
            current.pop();
            pieces.push(std::mem::replace(&mut current, c.to_string()));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Truncates text with an ellipsis so it fits in `max_width`
pub fn truncate_to_width(text: &str, max_width: f32, size: f32, style: FontStyle) -> String {
    if text_width(text, size, style) <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        out.push(c);
        if text_width(&format!("{}...", out), size, style) > max_width {
            out.pop();
            break;
        }
    }
    format!("{}...", out)
}
