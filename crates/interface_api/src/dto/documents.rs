//! Document DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{format_amount, DocumentId, ItemId};
use domain_document::{DocStatus, DocType, DocumentState};
use domain_pricing::DocumentPricing;

use crate::dto::pricing::FormattedTotals;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocumentRequest {
    pub doc_type: DocType,
    /// Defaults to the server's local date
    pub issue_date: Option<NaiveDate>,
}

/// A document together with its computed figures
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub document: DocumentState,
    pub pricing: DocumentPricing,
    pub formatted: FormattedTotals,
}

impl DocumentResponse {
    pub fn new(document: DocumentState) -> Self {
        let pricing = DocumentPricing::compute(&document);
        let formatted = FormattedTotals::new(&pricing.totals, document.currency);
        Self {
            document,
            pricing,
            formatted,
        }
    }
}

/// One row of the saved-documents list
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub doc_type: DocType,
    pub doc_number: String,
    pub status: DocStatus,
    pub title: String,
    pub client_name: String,
    pub issue_date: NaiveDate,
    pub total: Decimal,
    pub formatted_total: String,
}

impl From<&DocumentState> for DocumentSummary {
    fn from(document: &DocumentState) -> Self {
        let total = DocumentPricing::compute(document).totals.total;
        Self {
            id: document.id,
            doc_type: document.doc_type,
            doc_number: document.doc_number.clone(),
            status: document.status,
            title: document.title.clone(),
            client_name: document.client.name.clone(),
            issue_date: document.issue_date,
            total,
            formatted_total: format_amount(total, document.currency),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyMarkupResponse {
    pub item_id: ItemId,
    #[serde(flatten)]
    pub document: DocumentResponse,
}
