//! Page geometry in millimetres, measured from the top-left corner

use serde::Serialize;

pub const PT_TO_MM: f32 = 0.352_778;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Space reserved below the top margin for the repeating header
    pub header_band: f32,
    /// Space reserved above the bottom margin for the repeating footer
    pub footer_band: f32,
}

impl PageGeometry {
    /// US Letter, 12 mm margins
    pub const fn letter() -> Self {
        Self {
            width: 215.9,
            height: 279.4,
            margin: 12.0,
            header_band: 32.0,
            footer_band: 12.0,
        }
    }

    pub fn left(&self) -> f32 {
        self.margin
    }

    pub fn right(&self) -> f32 {
        self.width - self.margin
    }

    /// First y available to body content
    pub fn content_top(&self) -> f32 {
        self.margin + self.header_band
    }

    /// Last y available to body content
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin - self.footer_band
    }

    pub fn content_height(&self) -> f32 {
        self.content_bottom() - self.content_top()
    }

    pub fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_bands() {
        let page = PageGeometry::letter();
        assert_eq!(page.content_top(), 44.0);
        assert!((page.content_bottom() - 255.4).abs() < 1e-3);
        assert!((page.usable_width() - 191.9).abs() < 1e-3);
    }
}
