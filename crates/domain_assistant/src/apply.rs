//! Applying accepted suggestions to a document
//!
//! Both operations work on a copy of the document and swap it in only when
//! every step succeeded, so a rejected suggestion never leaves a partly
//! applied edit behind.

use serde::Serialize;
use tracing::info;

use core_kernel::{CategoryId, ItemId, SubcategoryId};
use domain_document::{ColumnRegistry, DocumentError, DocumentState, Item};

use crate::error::AssistantError;
use crate::parse::BulkCategory;

/// What a bulk application changed
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub created_categories: Vec<CategoryId>,
    pub inserted_items: usize,
}

/// Appends suggested items to one subcategory
pub fn apply_items(
    document: &mut DocumentState,
    category_id: CategoryId,
    subcategory_id: SubcategoryId,
    items: Vec<Item>,
    registry: &ColumnRegistry,
) -> Result<Vec<ItemId>, AssistantError> {
    let mut draft = document.clone();
    let ids = items
        .into_iter()
        .map(|item| draft.insert_item(category_id, subcategory_id, item, registry))
        .collect::<Result<Vec<_>, _>>()?;

    *document = draft;
    info!(category = %category_id, count = ids.len(), "Suggested items applied");
    Ok(ids)
}

/// Distributes grouped suggestions over the document's categories. Groups are
/// matched to existing categories by case-insensitive name and land in the
/// category's first subcategory; unmatched names create new categories.
pub fn apply_bulk(
    document: &mut DocumentState,
    groups: Vec<BulkCategory>,
    registry: &ColumnRegistry,
) -> Result<BulkOutcome, AssistantError> {
    let mut draft = document.clone();
    let mut outcome = BulkOutcome::default();

    for group in groups {
        let category_id = match draft.category_by_name(&group.name).map(|c| c.id) {
            Some(id) => id,
            None => {
                let id = draft.add_category(&group.name, registry)?;
                outcome.created_categories.push(id);
                id
            }
        };
        let subcategory_id = draft
            .category(category_id)?
            .subcategories
            .first()
            .map(|s| s.id)
            .ok_or_else(|| DocumentError::validation(format!("Category '{}' has no subcategory", group.name)))?;

        for item in group.items {
            draft.insert_item(category_id, subcategory_id, item, registry)?;
            outcome.inserted_items += 1;
        }
    }

    *document = draft;
    info!(
        created = outcome.created_categories.len(),
        inserted = outcome.inserted_items,
        "Bulk suggestions applied"
    );
    Ok(outcome)
}
