//! Infrastructure Store Layer
//!
//! Local persistence for the workspace. Every part (companies, active
//! company, open document, saved documents, clients, column registry and
//! imported ticket hashes) is stored under its own key, as its own JSON file
//! for [`JsonFileStore`].
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_store::{JsonFileStore, StoreKey, WorkspaceStore};
//!
//! let store = JsonFileStore::open("./data").await?;
//! let mut workspace = store.load_workspace().await?;
//! workspace.save_client(client)?;
//! store.save_parts(&workspace, &[StoreKey::Clients]).await?;
//! ```

pub mod error;
pub mod keys;
pub mod store;

pub use error::StoreError;
pub use keys::StoreKey;
pub use store::{InMemoryStore, JsonFileStore, WorkspaceStore};
