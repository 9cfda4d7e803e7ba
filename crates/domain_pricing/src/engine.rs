//! Pricing engine
//!
//! Every monetary figure shown for a document comes from here. The engine is
//! a pure function of the document: the live preview and the PDF export call
//! the same functions and can never disagree.
//!
//! Per category:
//!
//! ```text
//! raw      = Σ quantity × unitPrice
//! subtotal = raw                      (none)
//!          = raw × (1 + value/100)    (percentage)
//!          = raw + value              (fixed)
//! vat      = subtotal × rate/100      (iff show_vat and apply_vat)
//! ```
//!
//! The document subtotal is the sum of markup-inclusive category subtotals,
//! the document tax the sum of category VAT.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use core_kernel::{CategoryId, ItemId, Rate};
use domain_document::item::{MARKUP, TOTAL, VAT};
use domain_document::{CostCategory, DocumentState, Item, MarkupType};

/// Figures attributed to a single item, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFigures {
    pub subtotal: Decimal,
    pub markup: Decimal,
    pub vat: Decimal,
}

impl ItemFigures {
    /// The item's "total" column: `quantity × unitPrice`, without markup or VAT
    pub fn total(&self) -> Decimal {
        self.subtotal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPricing {
    pub item_id: ItemId,
    #[serde(flatten)]
    pub figures: ItemFigures,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPricing {
    pub category_id: CategoryId,
    pub raw_subtotal: Decimal,
    pub markup: Decimal,
    /// Markup-inclusive subtotal
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
    pub items: Vec<ItemPricing>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Every figure of a document, computed in one pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentPricing {
    pub categories: Vec<CategoryPricing>,
    pub totals: Totals,
}

impl DocumentPricing {
    pub fn compute(document: &DocumentState) -> Self {
        let categories: Vec<CategoryPricing> = document
            .categories
            .iter()
            .map(|category| price_category(document, category))
            .collect();

        let subtotal = categories
            .iter()
            .fold(Decimal::ZERO, |acc, c| sum(acc, c.subtotal));
        let tax = categories.iter().fold(Decimal::ZERO, |acc, c| sum(acc, c.vat));
        let totals = Totals {
            subtotal,
            tax,
            total: sum(subtotal, tax),
        };

        debug!(
            document_id = %document.id,
            categories = categories.len(),
            subtotal = %totals.subtotal,
            tax = %totals.tax,
            "Document priced"
        );
        Self { categories, totals }
    }

    pub fn category(&self, id: CategoryId) -> Option<&CategoryPricing> {
        self.categories.iter().find(|c| c.category_id == id)
    }

    pub fn item(&self, category_id: CategoryId, item_id: ItemId) -> Option<&ItemFigures> {
        self.category(category_id)?
            .items
            .iter()
            .find(|i| i.item_id == item_id)
            .map(|i| &i.figures)
    }
}

fn price_category(document: &DocumentState, category: &CostCategory) -> CategoryPricing {
    let raw_subtotal = category_raw_subtotal(category);
    let markup = category_markup(category, raw_subtotal);
    let subtotal = sum(raw_subtotal, markup);
    let vat = category_vat(document, category, subtotal);

    let items = category
        .items()
        .map(|item| ItemPricing {
            item_id: item.id,
            figures: attribute(document, category, item, raw_subtotal),
        })
        .collect();

    CategoryPricing {
        category_id: category.id,
        raw_subtotal,
        markup,
        subtotal,
        vat,
        total: sum(subtotal, vat),
        items,
    }
}

/// Σ `quantity × unitPrice` over every item of every subcategory
pub fn category_raw_subtotal(category: &CostCategory) -> Decimal {
    category
        .items()
        .fold(Decimal::ZERO, |acc, item| sum(acc, item.subtotal()))
}

/// Markup amount added on top of the raw subtotal
pub fn category_markup(category: &CostCategory, raw_subtotal: Decimal) -> Decimal {
    match category.markup_type {
        MarkupType::None => Decimal::ZERO,
        MarkupType::Percentage => percent_of(raw_subtotal, category.markup_value),
        MarkupType::Fixed => category.markup_value,
    }
}

/// True when both the document and the category enable VAT
pub fn vat_applies(document: &DocumentState, category: &CostCategory) -> bool {
    document.show_vat && category.apply_vat
}

/// VAT on a markup-inclusive category subtotal
pub fn category_vat(document: &DocumentState, category: &CostCategory, subtotal: Decimal) -> Decimal {
    if vat_applies(document, category) {
        percent_of(subtotal, document.vat_rate)
    } else {
        Decimal::ZERO
    }
}

/// Display figures for one item of a category
pub fn item_figures(document: &DocumentState, category: &CostCategory, item: &Item) -> ItemFigures {
    attribute(document, category, item, category_raw_subtotal(category))
}

fn attribute(
    document: &DocumentState,
    category: &CostCategory,
    item: &Item,
    raw_subtotal: Decimal,
) -> ItemFigures {
    let subtotal = item.subtotal();

    // Percentage markup is attributed the same way under either distribution
    // mode; only the category total is contractual.
    let markup = match category.markup_type {
        MarkupType::None => Decimal::ZERO,
        MarkupType::Percentage => percent_of(subtotal, category.markup_value),
        MarkupType::Fixed if raw_subtotal.is_zero() => Decimal::ZERO,
        // Multiply first so that exact shares stay exact
        MarkupType::Fixed => category
            .markup_value
            .checked_mul(subtotal)
            .and_then(|scaled| scaled.checked_div(raw_subtotal))
            .or_else(|| {
                subtotal
                    .checked_div(raw_subtotal)
                    .and_then(|share| share.checked_mul(category.markup_value))
            })
            .unwrap_or(Decimal::ZERO),
    };

    let vat = if vat_applies(document, category) {
        percent_of(sum(subtotal, markup), document.vat_rate)
    } else {
        Decimal::ZERO
    };

    ItemFigures { subtotal, markup, vat }
}

/// Document subtotal, tax and total
pub fn document_totals(document: &DocumentState) -> Totals {
    DocumentPricing::compute(document).totals
}

/// Value of a computed column (`total`, `markup`, `vat`) for an item;
/// `None` for stored keys
pub fn derived_value(
    document: &DocumentState,
    category: &CostCategory,
    item: &Item,
    key: &str,
) -> Option<Decimal> {
    let figures = item_figures(document, category, item);
    match key {
        TOTAL => Some(figures.total()),
        MARKUP => Some(figures.markup),
        VAT => Some(figures.vat),
        _ => None,
    }
}

fn percent_of(amount: Decimal, percentage: Decimal) -> Decimal {
    Rate::from_percentage(percentage)
        .checked_of(amount)
        .unwrap_or(Decimal::ZERO)
}

fn sum(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use domain_document::item::{QUANTITY, UNIT_PRICE};
    use domain_document::{ColumnRegistry, Company, DocType, Subcategory};

    fn document_with(category: CostCategory) -> DocumentState {
        let registry = ColumnRegistry::seeded();
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let mut doc = DocumentState::from_template(&Company::new("Acme"), DocType::Quote, &registry, date);
        doc.categories = vec![category];
        doc
    }

    fn item(qty: Decimal, price: Decimal) -> Item {
        Item::new().with(QUANTITY, qty).with(UNIT_PRICE, price)
    }

    fn category(markup_type: MarkupType, value: Decimal, items: Vec<Item>) -> CostCategory {
        let mut sub = Subcategory::new("General");
        sub.items = items;
        CostCategory::new("Labor", &ColumnRegistry::seeded())
            .with_markup(markup_type, value)
            .with_subcategories(vec![sub])
    }

    #[test]
    fn test_percentage_markup_with_vat() {
        let doc = document_with(category(
            MarkupType::Percentage,
            dec!(10),
            vec![item(dec!(2), dec!(50))],
        ));
        let pricing = DocumentPricing::compute(&doc);
        assert_eq!(pricing.totals.subtotal, dec!(110));
        assert_eq!(pricing.totals.tax, dec!(17.6));
        assert_eq!(pricing.totals.total, dec!(127.6));
    }

    #[test]
    fn test_fixed_markup_attribution() {
        let doc = document_with(category(
            MarkupType::Fixed,
            dec!(30),
            vec![item(dec!(1), dec!(100)), item(dec!(1), dec!(200))],
        ));
        let category = &doc.categories[0];
        let markups: Vec<Decimal> = category
            .items()
            .map(|i| item_figures(&doc, category, i).markup)
            .collect();
        assert_eq!(markups, vec![dec!(10), dec!(20)]);
    }

    #[test]
    fn test_fixed_markup_exact_for_uneven_shares() {
        let doc = document_with(category(
            MarkupType::Fixed,
            dec!(45),
            vec![item(dec!(1), dec!(70)), item(dec!(2), dec!(40))],
        ));
        let category = &doc.categories[0];
        let markups: Vec<Decimal> = category
            .items()
            .map(|i| item_figures(&doc, category, i).markup)
            .collect();
        assert_eq!(markups, vec![dec!(21), dec!(24)]);
    }

    #[test]
    fn test_fixed_markup_on_empty_category() {
        let doc = document_with(category(
            MarkupType::Fixed,
            dec!(30),
            vec![item(dec!(0), dec!(100))],
        ));
        let category = &doc.categories[0];
        let figures = item_figures(&doc, category, category.items().next().unwrap());
        assert_eq!(figures.markup, Decimal::ZERO);
        assert_eq!(DocumentPricing::compute(&doc).totals.subtotal, dec!(30));
    }

    #[test]
    fn test_vat_requires_both_flags() {
        let mut doc = document_with(
            category(MarkupType::None, Decimal::ZERO, vec![item(dec!(1), dec!(100))]).with_vat(false),
        );
        assert_eq!(document_totals(&doc).tax, Decimal::ZERO);

        doc.categories[0].apply_vat = true;
        doc.show_vat = false;
        assert_eq!(document_totals(&doc).tax, Decimal::ZERO);

        doc.show_vat = true;
        assert_eq!(document_totals(&doc).tax, dec!(16));
    }

    #[test]
    fn test_derived_value_keys() {
        let doc = document_with(category(
            MarkupType::Percentage,
            dec!(50),
            vec![item(dec!(2), dec!(10))],
        ));
        let category = &doc.categories[0];
        let it = category.items().next().unwrap();
        assert_eq!(derived_value(&doc, category, it, "total"), Some(dec!(20)));
        assert_eq!(derived_value(&doc, category, it, "markup"), Some(dec!(10)));
        assert_eq!(derived_value(&doc, category, it, "vat"), Some(dec!(4.8)));
        assert_eq!(derived_value(&doc, category, it, "quantity"), None);
    }
}
