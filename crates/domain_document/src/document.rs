//! The document aggregate
//!
//! `DocumentState` is the root of one quote, invoice or receipt. Every
//! editing operation validates first and mutates second, so a failed
//! operation leaves the document untouched.

use std::fmt;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{CategoryId, CompanyId, Currency, DocumentId, ItemId, SubcategoryId};

use crate::attachments::{Coupon, SignatureBlock, ThirdPartyTicket};
use crate::category::{CostCategory, MarkupDistribution, MarkupType};
use crate::client::ClientInfo;
use crate::columns::{ColumnDefinition, ColumnRegistry};
use crate::company::Company;
use crate::error::DocumentError;
use crate::item::{is_derived_key, Item, ItemValue};
use crate::layout::LayoutConfig;
use crate::payment_plan::PaymentPlanConfig;

/// Days a new document stays valid
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

/// VAT percentage applied to new documents
pub const DEFAULT_VAT_RATE: Decimal = dec!(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    #[default]
    Quote,
    Invoice,
    Estimate,
    Proposal,
    Receipt,
}

impl DocType {
    pub const ALL: [DocType; 5] = [
        DocType::Quote,
        DocType::Invoice,
        DocType::Estimate,
        DocType::Proposal,
        DocType::Receipt,
    ];

    /// Title printed in the document header
    pub fn label(&self) -> &'static str {
        match self {
            DocType::Quote => "Quote",
            DocType::Invoice => "Invoice",
            DocType::Estimate => "Estimate",
            DocType::Proposal => "Proposal",
            DocType::Receipt => "Receipt",
        }
    }

    pub fn default_prefix(&self) -> &'static str {
        match self {
            DocType::Quote => "COT-",
            DocType::Invoice => "FAC-",
            DocType::Estimate => "PRE-",
            DocType::Proposal => "PRO-",
            DocType::Receipt => "REC-",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            DocType::Quote => "quote",
            DocType::Invoice => "invoice",
            DocType::Estimate => "estimate",
            DocType::Proposal => "proposal",
            DocType::Receipt => "receipt",
        };
        write!(f, "{}", key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
    Paid,
    Cancelled,
}

/// One quotable document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentState {
    #[serde(default)]
    pub id: DocumentId,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub doc_type: DocType,
    #[serde(default)]
    pub doc_number: String,
    #[serde(default)]
    pub status: DocStatus,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub issuer_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub client: ClientInfo,
    #[serde(default)]
    pub categories: Vec<CostCategory>,
    #[serde(default)]
    pub show_vat: bool,
    /// Percentage, e.g. 16 for 16%
    #[serde(default)]
    pub vat_rate: Decimal,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub payment_plan: Option<PaymentPlanConfig>,
    #[serde(default)]
    pub coupon: Option<Coupon>,
    #[serde(default)]
    pub third_party_tickets: Vec<ThirdPartyTicket>,
    #[serde(default)]
    pub signatures: SignatureBlock,
    #[serde(default)]
    pub layout: LayoutConfig,
}

impl DocumentState {
    /// Creates a document scoped to a company, with the next folio for its
    /// type pre-assigned
    pub fn from_template(
        company: &Company,
        doc_type: DocType,
        registry: &ColumnRegistry,
        today: NaiveDate,
    ) -> Self {
        let doc_number = company.next_folio(doc_type, today);
        debug!(company_id = %company.id, doc_number = %doc_number, "Document created from template");

        Self {
            id: DocumentId::new(),
            company_id: Some(company.id),
            doc_type,
            doc_number,
            status: DocStatus::Draft,
            issue_date: today,
            valid_until: Some(today + Duration::days(DEFAULT_VALIDITY_DAYS)),
            issuer_name: company.name.clone(),
            title: String::new(),
            description: String::new(),
            client: ClientInfo::default(),
            categories: vec![CostCategory::new("General", registry)],
            show_vat: true,
            vat_rate: DEFAULT_VAT_RATE,
            currency: company.currency,
            terms: String::new(),
            payment_plan: None,
            coupon: None,
            third_party_tickets: Vec::new(),
            signatures: SignatureBlock::default(),
            layout: LayoutConfig::default(),
        }
    }

    pub fn category(&self, id: CategoryId) -> Result<&CostCategory, DocumentError> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .ok_or(DocumentError::CategoryNotFound(id))
    }

    pub fn category_mut(&mut self, id: CategoryId) -> Result<&mut CostCategory, DocumentError> {
        self.categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DocumentError::CategoryNotFound(id))
    }

    /// Case-insensitive lookup by display name
    pub fn category_by_name(&self, name: &str) -> Option<&CostCategory> {
        let name = name.trim();
        self.categories
            .iter()
            .find(|c| c.name.trim().eq_ignore_ascii_case(name))
    }

    /// Every item in the document, in display order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.categories.iter().flat_map(CostCategory::items)
    }

    pub fn add_category(
        &mut self,
        name: &str,
        registry: &ColumnRegistry,
    ) -> Result<CategoryId, DocumentError> {
        let name = non_empty(name, "Category name")?;
        let category = CostCategory::new(name, registry);
        let id = category.id;
        self.categories.push(category);
        Ok(id)
    }

    pub fn remove_category(&mut self, id: CategoryId) -> Result<CostCategory, DocumentError> {
        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or(DocumentError::CategoryNotFound(id))?;
        Ok(self.categories.remove(index))
    }

    pub fn rename_category(&mut self, id: CategoryId, name: &str) -> Result<(), DocumentError> {
        let name = non_empty(name, "Category name")?;
        self.category_mut(id)?.name = name;
        Ok(())
    }

    pub fn add_subcategory(
        &mut self,
        category_id: CategoryId,
        name: &str,
    ) -> Result<SubcategoryId, DocumentError> {
        let name = non_empty(name, "Subcategory name")?;
        Ok(self.category_mut(category_id)?.add_subcategory(name))
    }

    /// Removes a subcategory; the last one of a category cannot be removed
    pub fn remove_subcategory(
        &mut self,
        category_id: CategoryId,
        subcategory_id: SubcategoryId,
    ) -> Result<(), DocumentError> {
        self.category_mut(category_id)?
            .remove_subcategory(subcategory_id)
            .map(|_| ())
    }

    /// Subcategory names are display-only and need not be unique
    pub fn rename_subcategory(
        &mut self,
        category_id: CategoryId,
        subcategory_id: SubcategoryId,
        name: &str,
    ) -> Result<(), DocumentError> {
        let name = non_empty(name, "Subcategory name")?;
        self.category_mut(category_id)?
            .subcategory_mut(subcategory_id)?
            .name = name;
        Ok(())
    }

    /// Appends a new item seeded with the registry defaults
    pub fn add_item(
        &mut self,
        category_id: CategoryId,
        subcategory_id: SubcategoryId,
        registry: &ColumnRegistry,
    ) -> Result<ItemId, DocumentError> {
        self.insert_item(category_id, subcategory_id, registry.new_item(), registry)
    }

    /// Appends a prepared item; columns it lacks get their defaults
    pub fn insert_item(
        &mut self,
        category_id: CategoryId,
        subcategory_id: SubcategoryId,
        mut item: Item,
        registry: &ColumnRegistry,
    ) -> Result<ItemId, DocumentError> {
        let subcategory = self
            .category_mut(category_id)?
            .subcategory_mut(subcategory_id)?;
        for column in registry.editable_columns() {
            item.seed(&column.key, column.definition.default_value());
        }
        let id = item.id;
        subcategory.items.push(item);
        Ok(id)
    }

    pub fn remove_item(
        &mut self,
        category_id: CategoryId,
        item_id: ItemId,
    ) -> Result<Item, DocumentError> {
        self.category_mut(category_id)?.remove_item(item_id)
    }

    /// Sets one cell of an item. Computed keys and keys outside the
    /// registry are rejected.
    pub fn set_item_value(
        &mut self,
        category_id: CategoryId,
        item_id: ItemId,
        key: &str,
        value: ItemValue,
        registry: &ColumnRegistry,
    ) -> Result<(), DocumentError> {
        if is_derived_key(key) {
            return Err(DocumentError::DerivedField(key.to_string()));
        }
        if !registry.contains(key) {
            return Err(DocumentError::UnknownColumn(key.to_string()));
        }
        self.category_mut(category_id)?
            .find_item_mut(item_id)
            .ok_or(DocumentError::ItemNotFound(item_id))?
            .set(key, value)
    }

    pub fn set_markup(
        &mut self,
        category_id: CategoryId,
        markup_type: MarkupType,
        value: Decimal,
        distribution: MarkupDistribution,
    ) -> Result<(), DocumentError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DocumentError::validation("Markup value cannot be negative"));
        }
        let category = self.category_mut(category_id)?;
        category.markup_type = markup_type;
        category.markup_value = value;
        category.markup_distribution = distribution;
        Ok(())
    }

    pub fn set_column_visibility(
        &mut self,
        category_id: CategoryId,
        key: &str,
        visible: bool,
        registry: &ColumnRegistry,
    ) -> Result<(), DocumentError> {
        if !registry.contains(key) {
            return Err(DocumentError::UnknownColumn(key.to_string()));
        }
        self.category_mut(category_id)?
            .visible_columns
            .insert(key.to_string(), visible);
        Ok(())
    }

    /// Seeds a newly registered column into every item and category
    pub fn apply_new_column(&mut self, key: &str, definition: &ColumnDefinition) {
        let default = definition.default_value();
        for category in &mut self.categories {
            category
                .visible_columns
                .entry(key.to_string())
                .or_insert(definition.default_visible);
            for subcategory in &mut category.subcategories {
                for item in &mut subcategory.items {
                    item.seed(key, default.clone());
                }
            }
        }
    }

    /// Strips a deleted column from every item and category
    pub fn apply_removed_column(&mut self, key: &str) {
        for category in &mut self.categories {
            category.visible_columns.remove(key);
            for subcategory in &mut category.subcategories {
                for item in &mut subcategory.items {
                    item.remove(key);
                }
            }
        }
    }
}

fn non_empty(name: &str, what: &str) -> Result<String, DocumentError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DocumentError::validation(format!("{} cannot be empty", what)));
    }
    Ok(name.to_string())
}
