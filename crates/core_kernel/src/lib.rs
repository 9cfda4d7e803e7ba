//! Core Kernel - Foundational types and utilities for the quote builder
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Currencies, money formatting and percentage rates
//! - Folio (document number) generation
//! - Common identifiers and port error types

pub mod money;
pub mod folio;
pub mod identifiers;
pub mod ports;

pub use money::{Currency, Rate, format_amount};
pub use folio::{generate_folio, parse_folio_sequence, julian_suffix, FolioError};
pub use identifiers::{
    DocumentId, CategoryId, SubcategoryId, ItemId,
    CompanyId, ClientId, TicketId,
};
pub use ports::{PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable};
