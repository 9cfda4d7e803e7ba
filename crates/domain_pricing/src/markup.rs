//! "Apply markup as a line item"
//!
//! An explicit user action that turns the rest of the document into a lump
//! sum item inside one category.

use rust_decimal::Decimal;
use tracing::info;

use core_kernel::{CategoryId, ItemId};
use domain_document::item::{DESCRIPTION, QUANTITY, UNIT_PRICE};
use domain_document::{ColumnRegistry, DocumentState};

use crate::engine::DocumentPricing;
use crate::error::PricingError;

/// Amount the aggregate item would carry: the subtotal of every other
/// category, or the whole document subtotal when that is not positive
pub fn aggregate_markup_base(
    document: &DocumentState,
    category_id: CategoryId,
) -> Result<Decimal, PricingError> {
    let pricing = DocumentPricing::compute(document);
    let own = pricing
        .category(category_id)
        .ok_or(PricingError::CategoryNotFound(category_id))?
        .subtotal;

    let others = pricing.totals.subtotal - own;
    Ok(if others <= Decimal::ZERO {
        pricing.totals.subtotal
    } else {
        others
    })
}

/// Inserts an "Aggregate markup #n" item into the category's first
/// subcategory and returns its id
pub fn apply_markup_as_line_item(
    document: &mut DocumentState,
    category_id: CategoryId,
    registry: &ColumnRegistry,
) -> Result<ItemId, PricingError> {
    let base = aggregate_markup_base(document, category_id)?;
    let category = document.category(category_id)?;
    let subcategory_id = category
        .subcategories
        .first()
        .map(|s| s.id)
        .ok_or(PricingError::NoSubcategory(category_id))?;
    let sequence = category.markup_applications.saturating_add(1);

    let item = registry
        .new_item()
        .with(QUANTITY, Decimal::ONE)
        .with(UNIT_PRICE, base)
        .with(DESCRIPTION, format!("Aggregate markup #{}", sequence));
    let item_id = document.insert_item(category_id, subcategory_id, item, registry)?;
    document.category_mut(category_id)?.markup_applications = sequence;

    info!(category_id = %category_id, base = %base, sequence, "Markup applied as line item");
    Ok(item_id)
}
