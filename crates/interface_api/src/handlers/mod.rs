//! Request handlers

pub mod assistant;
pub mod clients;
pub mod columns;
pub mod companies;
pub mod documents;
pub mod export;
pub mod health;
pub mod pricing;
pub mod tickets;
