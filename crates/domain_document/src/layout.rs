//! Header, footer and page-numbering preferences for exported documents

use serde::{Deserialize, Serialize};

/// Token in the footer text replaced with the page number
pub const PAGE_TOKEN: &str = "{page}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageNumberStyle {
    #[default]
    Arabic,
    LowerRoman,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub show_logo: bool,
    pub header_note: Option<String>,
    /// Left-aligned footer content; may embed [`PAGE_TOKEN`]
    pub footer_text: String,
    pub show_page_numbers: bool,
    pub page_number_style: PageNumberStyle,
    /// `#rrggbb` used for titles and table headers
    pub accent_color: String,
    /// chrono format string for printed dates
    pub date_format: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            show_logo: true,
            header_note: None,
            footer_text: String::new(),
            show_page_numbers: true,
            page_number_style: PageNumberStyle::Arabic,
            accent_color: "#1f4e79".to_string(),
            date_format: "%d/%m/%Y".to_string(),
        }
    }
}

impl LayoutConfig {
    /// True when the footer text carries its own page-number slot
    pub fn footer_has_page_token(&self) -> bool {
        self.footer_text.contains(PAGE_TOKEN)
    }
}
