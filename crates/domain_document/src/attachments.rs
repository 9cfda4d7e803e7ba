//! Optional document blocks: coupon, signatures and third-party ticket annexes

use base64::Engine;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use core_kernel::TicketId;

/// Promotional coupon printed after the terms
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Coupon {
    pub enabled: bool,
    pub title: String,
    pub description: String,
    pub discount_label: String,
    pub code: String,
    pub valid_until: Option<NaiveDate>,
    /// Image as a `data:` URL
    pub image: Option<String>,
}

/// Signature lines at the end of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignatureBlock {
    pub show_signatures: bool,
    pub client_signature_label: String,
    pub client_name: String,
    pub company_signature_label: String,
    pub company_signer: String,
    /// Signature image as a `data:` URL; falls back to the company's signature
    pub company_signature_image: Option<String>,
}

impl Default for SignatureBlock {
    fn default() -> Self {
        Self {
            show_signatures: false,
            client_signature_label: "Client acceptance".to_string(),
            client_name: String::new(),
            company_signature_label: "Authorized by".to_string(),
            company_signer: String::new(),
            company_signature_image: None,
        }
    }
}

/// One line of an interpreted receipt
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptLine {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// Structured reading of a receipt photo
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterpretedReceipt {
    pub store_name: String,
    pub date: String,
    pub items: Vec<ReceiptLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// A third-party purchase ticket annexed to the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyTicket {
    #[serde(default)]
    pub id: TicketId,
    #[serde(default)]
    pub file_name: String,
    /// Original upload as a `data:` URL
    #[serde(default)]
    pub image: String,
    /// Hex SHA-256 of the uploaded bytes
    #[serde(default)]
    pub content_hash: String,
    #[serde(default)]
    pub interpreted: Option<InterpretedReceipt>,
}

impl ThirdPartyTicket {
    /// Wraps uploaded bytes as a ticket, hashing them for duplicate detection
    pub fn from_upload(file_name: impl Into<String>, mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            id: TicketId::new(),
            file_name: file_name.into(),
            image: to_data_url(mime_type, bytes),
            content_hash: content_hash(bytes),
            interpreted: None,
        }
    }

    pub fn with_interpretation(mut self, receipt: InterpretedReceipt) -> Self {
        self.interpreted = Some(receipt);
        self
    }
}

/// Hex-encoded SHA-256 of a file's bytes
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Encodes bytes as a base64 `data:` URL
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
