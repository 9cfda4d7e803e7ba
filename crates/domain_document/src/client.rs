//! Client snapshots
//!
//! A document stores a copy of the client; editing that copy never changes
//! the saved client record.

use serde::{Deserialize, Serialize};

use core_kernel::ClientId;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientInfo {
    pub id: ClientId,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub tax_id: String,
}

impl ClientInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Non-empty lines shown in the client block of a document
    pub fn display_lines(&self) -> Vec<String> {
        [
            &self.name,
            &self.company,
            &self.address,
            &self.email,
            &self.phone,
            &self.tax_id,
        ]
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.display_lines().is_empty()
    }
}
