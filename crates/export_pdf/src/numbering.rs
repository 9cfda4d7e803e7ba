//! Page numbering for the footer

use domain_document::{LayoutConfig, PageNumberStyle, PAGE_TOKEN};

const ROMAN: [(u32, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// Lowercase roman numeral for 1..=3999, `None` outside that range
pub fn to_roman(n: u32) -> Option<String> {
    if n == 0 || n > 3999 {
        return None;
    }
    let mut rest = n;
    let mut out = String::new();
    for (value, symbol) in ROMAN {
        while rest >= value {
            out.push_str(symbol);
            rest -= value;
        }
    }
    Some(out)
}

/// Formats a page number; roman falls back to arabic outside 1..=3999
pub fn format_page_number(page: u32, style: PageNumberStyle) -> String {
    match style {
        PageNumberStyle::Arabic => page.to_string(),
        PageNumberStyle::LowerRoman => to_roman(page).unwrap_or_else(|| page.to_string()),
    }
}

/// What the footer shows on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterText {
    pub left: String,
    pub right: Option<String>,
}

/// Resolves the footer for `page`. A `{page}` token in the footer text is
/// substituted in place; otherwise the number goes right-aligned.
pub fn footer_text(layout: &LayoutConfig, page: u32) -> FooterText {
    let number = format_page_number(page, layout.page_number_style);
    if layout.footer_has_page_token() {
        return FooterText {
            left: layout.footer_text.replace(PAGE_TOKEN, &number),
            right: None,
        };
    }
    FooterText {
        left: layout.footer_text.clone(),
        right: layout.show_page_numbers.then_some(number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roman_numerals() {
        assert_eq!(to_roman(1).as_deref(), Some("i"));
        assert_eq!(to_roman(4).as_deref(), Some("iv"));
        assert_eq!(to_roman(11).as_deref(), Some("xi"));
        assert_eq!(to_roman(1994).as_deref(), Some("mcmxciv"));
        assert_eq!(to_roman(3999).as_deref(), Some("mmmcmxcix"));
    }

    #[test]
    fn test_roman_out_of_range_falls_back() {
        assert_eq!(to_roman(0), None);
        assert_eq!(format_page_number(0, PageNumberStyle::LowerRoman), "0");
        assert_eq!(format_page_number(4000, PageNumberStyle::LowerRoman), "4000");
    }

    #[test]
    fn test_footer_token_substitution() {
        let mut layout = LayoutConfig::default();
        layout.footer_text = "Page {page} - Acme".to_string();
        layout.page_number_style = PageNumberStyle::LowerRoman;

        let footer = footer_text(&layout, 3);
        assert_eq!(footer.left, "Page iii - Acme");
        assert_eq!(footer.right, None);
    }

    #[test]
    fn test_footer_without_token() {
        let mut layout = LayoutConfig::default();
        layout.footer_text = "Thank you".to_string();

        assert_eq!(footer_text(&layout, 2).right.as_deref(), Some("2"));

        layout.show_page_numbers = false;
        assert_eq!(footer_text(&layout, 2).right, None);
    }
}
