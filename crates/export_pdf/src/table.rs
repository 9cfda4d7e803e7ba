//! Column widths for item tables
//!
//! Widths are computed per category since each category shows its own set
//! of columns. Numeric columns take a fixed share of the usable width; the
//! description and any other free-form columns split what is left.

use domain_document::item::{DESCRIPTION, MARKUP, QUANTITY, TOTAL, UNIT, UNIT_PRICE, VAT};
use serde::Serialize;

/// Share of the usable width given to description when other free-form
/// columns are present
const DESCRIPTION_SHARE: f32 = 0.6;

/// Free-form columns never get less than this share of the usable width
const MIN_DYNAMIC_SHARE: f32 = 0.25;

/// Preferred share of the usable width for fixed-ratio columns
pub fn fixed_ratio(key: &str) -> Option<f32> {
    match key {
        QUANTITY => Some(0.08),
        UNIT_PRICE => Some(0.13),
        TOTAL => Some(0.13),
        VAT => Some(0.11),
        MARKUP => Some(0.11),
        UNIT => Some(0.08),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSlot {
    pub key: String,
    /// Offset from the left margin
    pub x: f32,
    pub width: f32,
}

/// Lays out `keys` left to right across `usable_width`. The slots always
/// cover the full width when at least one key is given.
pub fn column_slots(keys: &[&str], usable_width: f32) -> Vec<ColumnSlot> {
    if keys.is_empty() {
        return Vec::new();
    }

    let fixed_total: f32 = keys.iter().filter_map(|k| fixed_ratio(k)).sum::<f32>() * usable_width;
    let dynamic: Vec<&str> = keys.iter().copied().filter(|k| fixed_ratio(k).is_none()).collect();

    // With no free-form column the fixed ones stretch to fill the row.
    let scale = if dynamic.is_empty() {
        usable_width / fixed_total
    } else if usable_width - fixed_total < usable_width * MIN_DYNAMIC_SHARE {
        usable_width * (1.0 - MIN_DYNAMIC_SHARE) / fixed_total
    } else {
        1.0
    };
    let remainder = (usable_width - fixed_total * scale).max(0.0);

    let has_description = dynamic.contains(&DESCRIPTION);
    let dynamic_width = |key: &str| -> f32 {
        match (has_description, dynamic.len()) {
            (true, 1) => remainder,
            (true, _) if key == DESCRIPTION => remainder * DESCRIPTION_SHARE,
            (true, n) => remainder * (1.0 - DESCRIPTION_SHARE) / (n - 1) as f32,
            (false, n) => remainder / n as f32,
        }
    };

    let mut x = 0.0;
    keys.iter()
        .map(|key| {
            let width = match fixed_ratio(key) {
                Some(ratio) => ratio * usable_width * scale,
                None => dynamic_width(key),
            };
            let slot = ColumnSlot {
                key: key.to_string(),
                x,
                width,
            };
            x += width;
            slot
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn width_of(slots: &[ColumnSlot], key: &str) -> f32 {
        slots.iter().find(|s| s.key == key).map(|s| s.width).unwrap_or(0.0)
    }

    fn covered(slots: &[ColumnSlot]) -> f32 {
        slots.iter().map(|s| s.width).sum()
    }

    #[test]
    fn test_description_takes_whole_remainder() {
        let slots = column_slots(&[DESCRIPTION, QUANTITY, UNIT_PRICE, TOTAL], 200.0);
        assert!((width_of(&slots, QUANTITY) - 16.0).abs() < 1e-3);
        assert!((width_of(&slots, DESCRIPTION) - 132.0).abs() < 1e-3);
        assert!((covered(&slots) - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_description_majority_with_other_dynamic_columns() {
        let slots = column_slots(&[DESCRIPTION, "brand", "color", TOTAL], 100.0);
        let remainder = 100.0 - 13.0;
        assert!((width_of(&slots, DESCRIPTION) - remainder * 0.6).abs() < 1e-3);
        assert!((width_of(&slots, "brand") - remainder * 0.2).abs() < 1e-3);
        assert!((width_of(&slots, "color") - remainder * 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_slots_are_contiguous() {
        let slots = column_slots(&[DESCRIPTION, UNIT, QUANTITY, TOTAL], 150.0);
        for pair in slots.windows(2) {
            assert!((pair[0].x + pair[0].width - pair[1].x).abs() < 1e-3);
        }
    }

    #[test]
    fn test_fixed_only_row_stretches() {
        let slots = column_slots(&[QUANTITY, TOTAL], 100.0);
        assert!((covered(&slots) - 100.0).abs() < 1e-3);
        assert!(width_of(&slots, TOTAL) > width_of(&slots, QUANTITY));
    }

    #[test]
    fn test_empty_keys() {
        assert!(column_slots(&[], 100.0).is_empty());
    }
}
