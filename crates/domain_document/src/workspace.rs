//! Application state
//!
//! The workspace holds everything one user edits: companies, the open
//! document, saved documents and clients, the column registry and the hashes
//! of imported tickets. It is passed explicitly to whoever needs it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use core_kernel::{parse_folio_sequence, ClientId, CompanyId, DocumentId};

use crate::client::ClientInfo;
use crate::columns::{ColumnDefinition, ColumnRegistry, ColumnUpdate, NewColumn};
use crate::company::Company;
use crate::document::{DocType, DocumentState};
use crate::error::DocumentError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub companies: Vec<Company>,
    pub active_company_id: Option<CompanyId>,
    pub current_document: Option<DocumentState>,
    pub saved_documents: Vec<DocumentState>,
    pub saved_clients: Vec<ClientInfo>,
    pub column_registry: ColumnRegistry,
    pub ticket_hashes: Vec<String>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Company::new("My Company"))
    }
}

impl Workspace {
    /// Creates a workspace with a single, active company
    pub fn new(company: Company) -> Self {
        Self {
            active_company_id: Some(company.id),
            companies: vec![company],
            current_document: None,
            saved_documents: Vec::new(),
            saved_clients: Vec::new(),
            column_registry: ColumnRegistry::seeded(),
            ticket_hashes: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Companies
    // ------------------------------------------------------------------

    /// Adds a company; the first company added becomes active
    pub fn add_company(&mut self, company: Company) -> CompanyId {
        let id = company.id;
        self.companies.push(company);
        if self.active_company_id.is_none() {
            self.active_company_id = Some(id);
        }
        info!(company_id = %id, "Company added");
        id
    }

    /// Replaces a stored company profile by id
    pub fn update_company(&mut self, company: Company) -> Result<(), DocumentError> {
        let slot = self.company_mut(company.id)?;
        *slot = company;
        Ok(())
    }

    pub fn remove_company(&mut self, id: CompanyId) -> Result<Company, DocumentError> {
        let index = self
            .companies
            .iter()
            .position(|c| c.id == id)
            .ok_or(DocumentError::CompanyNotFound(id))?;
        if self.active_company_id == Some(id) {
            return Err(DocumentError::ActiveCompanyRemoval);
        }
        if self.companies.len() == 1 {
            return Err(DocumentError::LastCompany);
        }
        info!(company_id = %id, "Company removed");
        Ok(self.companies.remove(index))
    }

    pub fn set_active_company(&mut self, id: CompanyId) -> Result<(), DocumentError> {
        self.company(id)?;
        self.active_company_id = Some(id);
        Ok(())
    }

    pub fn company(&self, id: CompanyId) -> Result<&Company, DocumentError> {
        self.companies
            .iter()
            .find(|c| c.id == id)
            .ok_or(DocumentError::CompanyNotFound(id))
    }

    pub fn company_mut(&mut self, id: CompanyId) -> Result<&mut Company, DocumentError> {
        self.companies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DocumentError::CompanyNotFound(id))
    }

    pub fn active_company(&self) -> Result<&Company, DocumentError> {
        let id = self.active_company_id.ok_or(DocumentError::NoActiveCompany)?;
        self.company(id)
    }

    /// The company a document belongs to, falling back to the active one
    pub fn company_for(&self, document: &DocumentState) -> Result<&Company, DocumentError> {
        match document.company_id.and_then(|id| self.company(id).ok()) {
            Some(company) => Ok(company),
            None => self.active_company(),
        }
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Opens a fresh document from the active company's template
    pub fn new_document(
        &mut self,
        doc_type: DocType,
        today: NaiveDate,
    ) -> Result<&DocumentState, DocumentError> {
        let company = self.active_company()?;
        let document = DocumentState::from_template(company, doc_type, &self.column_registry, today);
        info!(document_id = %document.id, doc_number = %document.doc_number, "New document opened");
        Ok(self.current_document.insert(document))
    }

    pub fn current_document(&self) -> Result<&DocumentState, DocumentError> {
        self.current_document
            .as_ref()
            .ok_or(DocumentError::NoCurrentDocument)
    }

    pub fn current_document_mut(&mut self) -> Result<&mut DocumentState, DocumentError> {
        self.current_document
            .as_mut()
            .ok_or(DocumentError::NoCurrentDocument)
    }

    pub fn set_current_document(&mut self, document: DocumentState) {
        self.current_document = Some(document);
    }

    pub fn document(&self, id: DocumentId) -> Result<&DocumentState, DocumentError> {
        self.saved_documents
            .iter()
            .find(|d| d.id == id)
            .ok_or(DocumentError::DocumentNotFound(id))
    }

    /// Makes a saved document the current one
    pub fn open_document(&mut self, id: DocumentId) -> Result<&DocumentState, DocumentError> {
        let document = self.document(id)?.clone();
        Ok(self.current_document.insert(document))
    }

    /// Stores a document, replacing any saved copy with the same id. When the
    /// folio's sequence exceeds the owning company's counter for its type,
    /// the counter advances.
    pub fn save_document(&mut self, document: DocumentState) -> Result<(), DocumentError> {
        let company_id = self.company_for(&document)?.id;
        let company = self.company_mut(company_id)?;
        match parse_folio_sequence(&document.doc_number, company.prefix_for(document.doc_type)) {
            Ok(sequence) => {
                company.advance_counter(document.doc_type, sequence);
            }
            Err(e) => {
                warn!(doc_number = %document.doc_number, error = %e, "Folio not parsed, counter unchanged");
            }
        }

        match self.saved_documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => self.saved_documents.push(document),
        }
        debug!(saved = self.saved_documents.len(), "Document saved");
        Ok(())
    }

    pub fn delete_document(&mut self, id: DocumentId) -> Result<DocumentState, DocumentError> {
        let index = self
            .saved_documents
            .iter()
            .position(|d| d.id == id)
            .ok_or(DocumentError::DocumentNotFound(id))?;
        Ok(self.saved_documents.remove(index))
    }

    // ------------------------------------------------------------------
    // Clients
    // ------------------------------------------------------------------

    pub fn save_client(&mut self, client: ClientInfo) -> Result<ClientId, DocumentError> {
        if client.name.trim().is_empty() {
            return Err(DocumentError::validation("Client name cannot be empty"));
        }
        let id = client.id;
        match self.saved_clients.iter_mut().find(|c| c.id == id) {
            Some(existing) => *existing = client,
            None => self.saved_clients.push(client),
        }
        Ok(id)
    }

    pub fn delete_client(&mut self, id: ClientId) -> Result<ClientInfo, DocumentError> {
        let index = self
            .saved_clients
            .iter()
            .position(|c| c.id == id)
            .ok_or(DocumentError::ClientNotFound(id))?;
        Ok(self.saved_clients.remove(index))
    }

    // ------------------------------------------------------------------
    // Ticket hashes
    // ------------------------------------------------------------------

    /// Records an imported ticket's hash. Returns true when the same file
    /// was imported before; callers warn but still accept the import.
    pub fn register_ticket_hash(&mut self, hash: &str) -> bool {
        if self.is_known_ticket(hash) {
            warn!(hash = %hash, "Ticket was imported before");
            return true;
        }
        self.ticket_hashes.push(hash.to_string());
        false
    }

    pub fn is_known_ticket(&self, hash: &str) -> bool {
        self.ticket_hashes.iter().any(|h| h == hash)
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    /// Registers a column and seeds it into the open document
    pub fn add_column(&mut self, request: NewColumn) -> Result<String, DocumentError> {
        let key = self.column_registry.add_column(request)?;
        if let (Some(document), Some(definition)) =
            (self.current_document.as_mut(), self.column_registry.get(&key))
        {
            document.apply_new_column(&key, definition);
        }
        Ok(key)
    }

    pub fn update_column(
        &mut self,
        key: &str,
        update: ColumnUpdate,
    ) -> Result<ColumnDefinition, DocumentError> {
        Ok(self.column_registry.update_column(key, update)?.clone())
    }

    /// Deletes a column and strips it from the open document
    pub fn remove_column(&mut self, key: &str) -> Result<(), DocumentError> {
        self.column_registry.remove_column(key)?;
        if let Some(document) = self.current_document.as_mut() {
            document.apply_removed_column(key);
        }
        Ok(())
    }
}
