//! Request/Response data transfer objects

pub mod assistant;
pub mod columns;
pub mod companies;
pub mod documents;
pub mod pricing;
pub mod tickets;
