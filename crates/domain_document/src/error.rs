//! Document domain errors
//!
//! Every error here is a validation failure of a single editing action: the
//! action is aborted and the document, registry or workspace is left as it was.

use thiserror::Error;

use core_kernel::{CategoryId, ClientId, CompanyId, DocumentId, ItemId, SubcategoryId};

/// Errors raised by column registry mutations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ColumnError {
    /// The label is empty or has no alphanumeric characters
    #[error("Column label must contain at least one letter or digit")]
    EmptyLabel,

    /// The derived key is already registered
    #[error("A column with key '{0}' already exists")]
    DuplicateKey(String),

    /// No column is registered under this key
    #[error("Column not found: {0}")]
    NotFound(String),

    /// Built-in columns cannot be deleted
    #[error("Column '{0}' is built in and cannot be deleted")]
    Protected(String),

    /// Deleting would leave the registry empty
    #[error("At least one column must remain")]
    LastColumn,

    /// The input widget cannot edit this data type
    #[error("Input type '{input}' is not compatible with data type '{data_type}'")]
    IncompatibleInput { data_type: String, input: String },

    /// Select inputs need at least one option
    #[error("Column '{0}' uses a select input but has no options")]
    MissingOptions(String),

    /// Structural properties of computed or pricing columns are fixed
    #[error("Column '{0}' is used for pricing and its type cannot change")]
    FixedColumn(String),
}

/// Errors that can occur in the document domain
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    #[error("Subcategory not found: {0}")]
    SubcategoryNotFound(SubcategoryId),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// A category must keep at least one subcategory
    #[error("A category must keep at least one subcategory")]
    LastSubcategory,

    /// `total`, `markup` and `vat` are computed and never stored
    #[error("Field '{0}' is computed and cannot be edited")]
    DerivedField(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Company not found: {0}")]
    CompanyNotFound(CompanyId),

    #[error("No active company selected")]
    NoActiveCompany,

    #[error("The active company cannot be removed")]
    ActiveCompanyRemoval,

    #[error("At least one company must remain")]
    LastCompany,

    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("No document is currently open")]
    NoCurrentDocument,

    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Column(#[from] ColumnError),
}

impl DocumentError {
    pub fn validation(message: impl Into<String>) -> Self {
        DocumentError::Validation(message.into())
    }
}
