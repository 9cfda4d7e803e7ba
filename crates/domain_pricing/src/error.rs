//! Pricing domain errors

use thiserror::Error;

use core_kernel::CategoryId;
use domain_document::DocumentError;

/// Errors that can occur while pricing or restructuring a document
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// The category has nowhere to put a new item
    #[error("Category {0} has no subcategory")]
    NoSubcategory(CategoryId),

    #[error(transparent)]
    Document(#[from] DocumentError),
}
