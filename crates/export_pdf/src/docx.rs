//! Word export
//!
//! Not implemented; callers get [`ExportError::Unsupported`].

use domain_document::{ColumnRegistry, Company, DocumentState};
use tracing::warn;

use crate::error::ExportError;

pub fn export_docx(
    document: &DocumentState,
    _company: &Company,
    _registry: &ColumnRegistry,
) -> Result<Vec<u8>, ExportError> {
    warn!(document_id = %document.id, "Word export requested but not supported");
    Err(ExportError::Unsupported("Word"))
}
