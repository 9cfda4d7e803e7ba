//! Workspace persistence
//!
//! `WorkspaceStore` backends only move raw JSON text per [`StoreKey`];
//! decoding, defaults and the reassembly of a [`Workspace`] are shared.
//!
//! Loading is lenient about absence and strict about damage: a part that was
//! never written loads as its default, a part that exists but does not decode
//! is a [`StoreError::Corrupt`].

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use core_kernel::CompanyId;
use domain_document::{ClientInfo, ColumnRegistry, Company, DocumentState, Workspace};

use crate::error::StoreError;
use crate::keys::StoreKey;

fn decode<T: DeserializeOwned>(key: StoreKey, raw: Option<String>) -> Result<Option<T>, StoreError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| {
                warn!(file = %key, error = %e, "Stored part does not decode");
                StoreError::Corrupt {
                    file: key.file_name().to_string(),
                    message: e.to_string(),
                }
            }),
        _ => Ok(None),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string_pretty(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn encode(workspace: &Workspace, key: StoreKey) -> Result<String, StoreError> {
    match key {
        StoreKey::Companies => to_json(&workspace.companies),
        StoreKey::ActiveCompany => to_json(&workspace.active_company_id),
        StoreKey::CurrentDocument => to_json(&workspace.current_document),
        StoreKey::Documents => to_json(&workspace.saved_documents),
        StoreKey::Clients => to_json(&workspace.saved_clients),
        StoreKey::Columns => to_json(&workspace.column_registry),
        StoreKey::TicketHashes => to_json(&workspace.ticket_hashes),
    }
}

/// Key-value storage of workspace parts
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Raw contents stored under `key`, `None` when nothing was written
    async fn read_raw(&self, key: StoreKey) -> Result<Option<String>, StoreError>;

    async fn write_raw(&self, key: StoreKey, contents: String) -> Result<(), StoreError>;

    /// Reassembles the workspace. With no stored companies the default
    /// workspace company is used; a stale active id falls back to the first
    /// company.
    async fn load_workspace(&self) -> Result<Workspace, StoreError> {
        let companies: Vec<Company> =
            decode(StoreKey::Companies, self.read_raw(StoreKey::Companies).await?)?.unwrap_or_default();
        let active =
            decode::<Option<CompanyId>>(StoreKey::ActiveCompany, self.read_raw(StoreKey::ActiveCompany).await?)?.flatten();
        let current_document =
            decode::<Option<DocumentState>>(StoreKey::CurrentDocument, self.read_raw(StoreKey::CurrentDocument).await?)?.flatten();
        let saved_documents: Vec<DocumentState> =
            decode(StoreKey::Documents, self.read_raw(StoreKey::Documents).await?)?.unwrap_or_default();
        let saved_clients: Vec<ClientInfo> =
            decode(StoreKey::Clients, self.read_raw(StoreKey::Clients).await?)?.unwrap_or_default();
        let column_registry: Option<ColumnRegistry> =
            decode(StoreKey::Columns, self.read_raw(StoreKey::Columns).await?)?;
        let ticket_hashes: Vec<String> =
            decode(StoreKey::TicketHashes, self.read_raw(StoreKey::TicketHashes).await?)?.unwrap_or_default();

        let companies = if companies.is_empty() {
            Workspace::default().companies
        } else {
            companies
        };
        let active_company_id = active
            .filter(|id| companies.iter().any(|c| c.id == *id))
            .or_else(|| companies.first().map(|c| c.id));
        let column_registry = column_registry
            .filter(|registry| !registry.is_empty())
            .unwrap_or_else(ColumnRegistry::seeded);

        debug!(
            companies = companies.len(),
            documents = saved_documents.len(),
            clients = saved_clients.len(),
            "Workspace loaded"
        );
        Ok(Workspace {
            companies,
            active_company_id,
            current_document,
            saved_documents,
            saved_clients,
            column_registry,
            ticket_hashes,
        })
    }

    /// Writes only the given parts
    async fn save_parts(&self, workspace: &Workspace, keys: &[StoreKey]) -> Result<(), StoreError> {
        for key in keys {
            let contents = encode(workspace, *key)?;
            self.write_raw(*key, contents).await?;
        }
        Ok(())
    }

    async fn save_workspace(&self, workspace: &Workspace) -> Result<(), StoreError> {
        self.save_parts(workspace, &StoreKey::ALL).await
    }
}

/// One JSON file per part under a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Opens the store, creating the directory when needed
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io(&root, e))?;
        info!(path = %root.display(), "Workspace store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, key: StoreKey) -> PathBuf {
        self.root.join(key.file_name())
    }
}

#[async_trait]
impl WorkspaceStore for JsonFileStore {
    async fn read_raw(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        let path = self.path_of(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Writes to a sibling temp file and renames it over the target
    async fn write_raw(&self, key: StoreKey, contents: String) -> Result<(), StoreError> {
        let path = self.path_of(key);
        let temp = self.root.join(format!("{}.tmp", key.file_name()));
        tokio::fs::write(&temp, contents)
            .await
            .map_err(|e| StoreError::io(&temp, e))?;
        tokio::fs::rename(&temp, &path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        debug!(file = %key, "Stored part written");
        Ok(())
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    parts: RwLock<HashMap<StoreKey, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates a part with raw contents
    pub async fn with_raw(self, key: StoreKey, contents: impl Into<String>) -> Self {
        self.parts.write().await.insert(key, contents.into());
        self
    }
}

#[async_trait]
impl WorkspaceStore for InMemoryStore {
    async fn read_raw(&self, key: StoreKey) -> Result<Option<String>, StoreError> {
        Ok(self.parts.read().await.get(&key).cloned())
    }

    async fn write_raw(&self, key: StoreKey, contents: String) -> Result<(), StoreError> {
        self.parts.write().await.insert(key, contents);
        Ok(())
    }
}
