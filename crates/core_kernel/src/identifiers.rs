//! Identifiers for documents, their tree nodes and the parties around them
//!
//! Each is a UUID newtype. JSON carries the bare UUID; `Display` adds a short
//! kind tag (`ITM-…`) for logs, and parsing accepts either form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Kind tag used by `Display`
            pub const TAG: &'static str = $tag;

            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", Self::TAG, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .strip_prefix(Self::TAG)
                    .and_then(|rest| rest.strip_prefix('-'))
                    .unwrap_or(s);
                Uuid::parse_str(raw).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

entity_id!(
    /// A quote, invoice or receipt
    DocumentId => "DOC"
);
entity_id!(CategoryId => "CAT");
entity_id!(SubcategoryId => "SUB");
entity_id!(ItemId => "ITM");
entity_id!(
    /// An issuing company profile
    CompanyId => "CMP"
);
entity_id!(
    /// A saved client
    ClientId => "CLI"
);
entity_id!(
    /// A third-party ticket attached as an annex
    TicketId => "TKT"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_tag() {
        assert!(DocumentId::new().to_string().starts_with("DOC-"));
    }

    #[test]
    fn test_tagged_and_bare_forms_parse_alike() {
        let id = ItemId::new();
        let tagged: ItemId = id.to_string().parse().unwrap();
        let bare: ItemId = id.as_uuid().to_string().parse().unwrap();
        assert_eq!(tagged, bare);
    }
}
