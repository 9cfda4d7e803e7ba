//! Company profiles
//!
//! A company owns its branding, fiscal profile and a folio counter per
//! document type. Counters only move forward.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{generate_folio, CompanyId, Currency};

use crate::document::DocType;

/// Tax registration data. Certificate blobs are stored as uploaded and
/// never parsed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FiscalProfile {
    pub regime: String,
    pub postal_code: String,
    pub certificate: Option<String>,
    pub private_key: Option<String>,
}

/// Catalog entry offered to the suggestion service as pricing context
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingTemplate {
    pub name: String,
    /// "labor" or "material"
    pub kind: String,
    pub unit: String,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolEntry {
    pub name: String,
    pub daily_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default)]
    pub id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub legal_name: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    /// Logo as a `data:` URL
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub folio_prefixes: BTreeMap<DocType, String>,
    #[serde(default)]
    pub folio_counters: BTreeMap<DocType, u64>,
    #[serde(default)]
    pub fiscal: FiscalProfile,
    #[serde(default)]
    pub pricing_templates: Vec<PricingTemplate>,
    #[serde(default)]
    pub tools: Vec<ToolEntry>,
    /// Signature image as a `data:` URL
    #[serde(default)]
    pub signature: Option<String>,
}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CompanyId::new(),
            name: name.into(),
            legal_name: String::new(),
            tax_id: String::new(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            logo: None,
            currency: Currency::default(),
            folio_prefixes: BTreeMap::new(),
            folio_counters: BTreeMap::new(),
            fiscal: FiscalProfile::default(),
            pricing_templates: Vec::new(),
            tools: Vec::new(),
            signature: None,
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_prefix(mut self, doc_type: DocType, prefix: impl Into<String>) -> Self {
        self.folio_prefixes.insert(doc_type, prefix.into());
        self
    }

    pub fn with_counter(mut self, doc_type: DocType, counter: u64) -> Self {
        self.folio_counters.insert(doc_type, counter);
        self
    }

    /// Configured prefix, or the document type's default
    pub fn prefix_for(&self, doc_type: DocType) -> &str {
        self.folio_prefixes
            .get(&doc_type)
            .map(String::as_str)
            .unwrap_or_else(|| doc_type.default_prefix())
    }

    /// Last sequence used for this document type
    pub fn counter_for(&self, doc_type: DocType) -> u64 {
        self.folio_counters.get(&doc_type).copied().unwrap_or(0)
    }

    /// Folio the next document of this type would receive
    pub fn next_folio(&self, doc_type: DocType, date: NaiveDate) -> String {
        generate_folio(
            self.prefix_for(doc_type),
            self.counter_for(doc_type).saturating_add(1),
            date,
        )
    }

    /// Raises the counter to `sequence`; lower values are ignored.
    /// Returns true when the counter moved.
    pub fn advance_counter(&mut self, doc_type: DocType, sequence: u64) -> bool {
        let current = self.counter_for(doc_type);
        if sequence <= current {
            return false;
        }
        debug!(company_id = %self.id, doc_type = %doc_type, from = current, to = sequence, "Folio counter advanced");
        self.folio_counters.insert(doc_type, sequence);
        true
    }
}
