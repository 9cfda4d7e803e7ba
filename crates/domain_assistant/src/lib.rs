//! Assistant Domain
//!
//! Drafting help from an external text/vision completion service: document
//! descriptions, terms and conditions, line items (flat or grouped by
//! category) and receipt transcriptions.
//!
//! # Flow
//!
//! ```text
//! SuggestionRequest ─ prompt ─► CompletionRequest ─► CompletionPort
//!                                 (schema from the        │
//!                                  column registry)       ▼
//!                    document ◄─ apply ◄─ parse/validate ◄─ raw text
//! ```
//!
//! Output that does not match the expected shape is an
//! [`AssistantError::MalformedResponse`]; the document is only changed by the
//! `apply_*` functions, and only when the whole suggestion fits.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_assistant::{SuggestionService, SuggestionRequest, apply_items};
//!
//! let items = service.suggest_items(&SuggestionRequest::new("Paint two bedrooms"), Some(&company), &registry).await?;
//! apply_items(&mut document, category_id, subcategory_id, items, &registry)?;
//! ```

pub mod adapters;
pub mod apply;
pub mod error;
pub mod parse;
pub mod ports;
pub mod prompt;
pub mod request;
pub mod schema;
pub mod service;

pub use adapters::{GeminiAdapter, GeminiConfig, MockCompletionPort};
pub use apply::{apply_bulk, apply_items, BulkOutcome};
pub use error::AssistantError;
pub use parse::{parse_bulk_items, parse_items, parse_receipt, parse_text, strip_fences, BulkCategory};
pub use ports::CompletionPort;
pub use request::{CompletionRequest, ImageAttachment, Quality, SuggestionKind, SuggestionRequest, Tone};
pub use schema::{bulk_schema, item_schema, items_schema, receipt_schema};
pub use service::SuggestionService;
