//! Document Domain
//!
//! This crate holds the data model of a quotable document and the workspace
//! it is edited in.
//!
//! # Structure
//!
//! ```text
//! Workspace
//!  ├─ companies ─ folio prefixes and counters per document type
//!  ├─ column registry ─ user-extensible item schema
//!  └─ DocumentState
//!      └─ CostCategory (markup, VAT flag, column visibility)
//!          └─ Subcategory
//!              └─ Item (id + typed value per column key)
//! ```
//!
//! Item fields `total`, `markup` and `vat` are never stored; the pricing crate
//! computes them from `quantity`, `unitPrice` and the owning category.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_document::{Workspace, DocType};
//!
//! let mut workspace = Workspace::default();
//! let document = workspace.new_document(DocType::Quote, today)?;
//! assert!(document.doc_number.starts_with("COT-"));
//! ```

pub mod attachments;
pub mod category;
pub mod client;
pub mod columns;
pub mod company;
pub mod document;
pub mod error;
pub mod item;
pub mod layout;
pub mod payment_plan;
pub mod workspace;

pub use attachments::{
    content_hash, to_data_url, Coupon, InterpretedReceipt, ReceiptLine, SignatureBlock,
    ThirdPartyTicket,
};
pub use category::{CostCategory, MarkupDistribution, MarkupType, Subcategory};
pub use client::ClientInfo;
pub use columns::{
    derive_key, Column, ColumnDefinition, ColumnRegistry, ColumnUpdate, DataType, InputType,
    NewColumn, SEED_KEYS,
};
pub use company::{Company, FiscalProfile, PricingTemplate, ToolEntry};
pub use document::{DocStatus, DocType, DocumentState};
pub use error::{ColumnError, DocumentError};
pub use item::{is_derived_key, Item, ItemValue};
pub use layout::{LayoutConfig, PageNumberStyle, PAGE_TOKEN};
pub use payment_plan::{PaymentPeriod, PaymentPlanConfig, MAX_PAYMENT_TERM};
pub use workspace::Workspace;
