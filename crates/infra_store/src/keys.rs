//! Storage keys
//!
//! Each part of the workspace lives under its own key so that editing, say,
//! the client list never rewrites the saved documents.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    Companies,
    ActiveCompany,
    CurrentDocument,
    Documents,
    Clients,
    Columns,
    TicketHashes,
}

impl StoreKey {
    pub const ALL: [StoreKey; 7] = [
        StoreKey::Companies,
        StoreKey::ActiveCompany,
        StoreKey::CurrentDocument,
        StoreKey::Documents,
        StoreKey::Clients,
        StoreKey::Columns,
        StoreKey::TicketHashes,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            StoreKey::Companies => "companies.json",
            StoreKey::ActiveCompany => "active_company.json",
            StoreKey::CurrentDocument => "current_document.json",
            StoreKey::Documents => "documents.json",
            StoreKey::Clients => "clients.json",
            StoreKey::Columns => "columns.json",
            StoreKey::TicketHashes => "ticket_hashes.json",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
