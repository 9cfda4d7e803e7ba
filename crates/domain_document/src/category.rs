//! Cost categories and subcategories
//!
//! A category groups subcategories of items and carries the markup rule and
//! VAT applicability used by the pricing engine.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CategoryId, ItemId, SubcategoryId};

use crate::columns::ColumnRegistry;
use crate::error::DocumentError;
use crate::item::Item;

/// How a category's markup is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupType {
    #[default]
    None,
    Percentage,
    Fixed,
}

/// How a percentage markup is attributed back to items for display.
/// Both modes currently attribute identically; the category total never
/// depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkupDistribution {
    #[default]
    Proportional,
    PerItem,
}

/// A named bucket of items inside a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    #[serde(default)]
    pub id: SubcategoryId,
    pub name: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Subcategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SubcategoryId::new(),
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }
}

/// A named grouping of line items with its own markup and VAT rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostCategory {
    #[serde(default)]
    pub id: CategoryId,
    pub name: String,
    pub subcategories: Vec<Subcategory>,
    #[serde(default)]
    pub visible_columns: BTreeMap<String, bool>,
    #[serde(default = "default_true")]
    pub apply_vat: bool,
    #[serde(default)]
    pub markup_type: MarkupType,
    #[serde(default)]
    pub markup_value: Decimal,
    #[serde(default)]
    pub markup_distribution: MarkupDistribution,
    /// Counts "apply markup as line item" runs, used only for labels
    #[serde(default)]
    pub markup_applications: u32,
}

fn default_true() -> bool {
    true
}

impl CostCategory {
    /// Creates a category with one empty subcategory and the registry's
    /// default column visibility
    pub fn new(name: impl Into<String>, registry: &ColumnRegistry) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            subcategories: vec![Subcategory::new("General")],
            visible_columns: registry.default_visibility(),
            apply_vat: true,
            markup_type: MarkupType::None,
            markup_value: Decimal::ZERO,
            markup_distribution: MarkupDistribution::Proportional,
            markup_applications: 0,
        }
    }

    pub fn with_markup(mut self, markup_type: MarkupType, value: Decimal) -> Self {
        self.markup_type = markup_type;
        self.markup_value = value;
        self
    }

    pub fn with_vat(mut self, apply_vat: bool) -> Self {
        self.apply_vat = apply_vat;
        self
    }

    pub fn with_subcategories(mut self, subcategories: Vec<Subcategory>) -> Self {
        if !subcategories.is_empty() {
            self.subcategories = subcategories;
        }
        self
    }

    /// Every item in every subcategory, in display order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.subcategories.iter().flat_map(|s| s.items.iter())
    }

    pub fn is_column_visible(&self, key: &str) -> bool {
        self.visible_columns.get(key).copied().unwrap_or(false)
    }

    /// Visible column keys in registry order
    pub fn visible_column_keys<'r>(&self, registry: &'r ColumnRegistry) -> Vec<&'r str> {
        registry
            .keys()
            .filter(|key| self.is_column_visible(key))
            .collect()
    }

    pub fn subcategory(&self, id: SubcategoryId) -> Result<&Subcategory, DocumentError> {
        self.subcategories
            .iter()
            .find(|s| s.id == id)
            .ok_or(DocumentError::SubcategoryNotFound(id))
    }

    pub fn subcategory_mut(&mut self, id: SubcategoryId) -> Result<&mut Subcategory, DocumentError> {
        self.subcategories
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(DocumentError::SubcategoryNotFound(id))
    }

    pub fn add_subcategory(&mut self, name: impl Into<String>) -> SubcategoryId {
        let subcategory = Subcategory::new(name);
        let id = subcategory.id;
        self.subcategories.push(subcategory);
        id
    }

    /// Removes a subcategory; the last one cannot be removed
    pub fn remove_subcategory(&mut self, id: SubcategoryId) -> Result<Subcategory, DocumentError> {
        let index = self
            .subcategories
            .iter()
            .position(|s| s.id == id)
            .ok_or(DocumentError::SubcategoryNotFound(id))?;
        if self.subcategories.len() == 1 {
            return Err(DocumentError::LastSubcategory);
        }
        Ok(self.subcategories.remove(index))
    }

    pub fn find_item(&self, id: ItemId) -> Option<&Item> {
        self.items().find(|item| item.id == id)
    }

    pub fn find_item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.subcategories
            .iter_mut()
            .flat_map(|s| s.items.iter_mut())
            .find(|item| item.id == id)
    }

    /// Removes an item from whichever subcategory holds it
    pub fn remove_item(&mut self, id: ItemId) -> Result<Item, DocumentError> {
        for subcategory in &mut self.subcategories {
            if let Some(index) = subcategory.items.iter().position(|i| i.id == id) {
                return Ok(subcategory.items.remove(index));
            }
        }
        Err(DocumentError::ItemNotFound(id))
    }
}
