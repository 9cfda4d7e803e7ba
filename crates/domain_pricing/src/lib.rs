//! Pricing Domain
//!
//! Derives every monetary figure of a document: item subtotals, markup and
//! VAT attribution, category subtotals and the document totals, plus the
//! payment-plan options offered on the total.
//!
//! # Reconciliation
//!
//! - Σ category subtotal (markup-inclusive) = document subtotal
//! - Σ category VAT = document tax
//! - fixed markup: Σ item markup = category markup (when the raw subtotal is
//!   not zero)
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_pricing::{DocumentPricing, calculate_payment_plan};
//!
//! let pricing = DocumentPricing::compute(&document);
//! let options = calculate_payment_plan(pricing.totals.total, &plan);
//! ```

pub mod engine;
pub mod error;
pub mod markup;
pub mod payment_plan;

pub use engine::{
    category_markup, category_raw_subtotal, category_vat, derived_value, document_totals,
    item_figures, vat_applies, CategoryPricing, DocumentPricing, ItemFigures, ItemPricing, Totals,
};
pub use error::PricingError;
pub use markup::{aggregate_markup_base, apply_markup_as_line_item};
pub use payment_plan::{annual_rate, calculate_payment_plan, financed_balance, PaymentOption};
