//! Port error and health types
//!
//! External collaborators (the completion service today) sit behind port
//! traits that extend [`DomainPort`]. Adapters report failures as
//! [`PortError`] so callers never see transport types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a call across a port
#[derive(Debug, Error)]
pub enum PortError {
    /// Model, file or record missing on the remote side
    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: String, id: String },

    /// Rejected request, including blocked prompts
    #[error("Request rejected: {message}")]
    Validation { message: String },

    #[error("Could not reach service: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    /// Missing, invalid or revoked credentials
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// 5xx from the service
    #[error("{service} unavailable")]
    ServiceUnavailable { service: String },

    /// A reply arrived but could not be read
    #[error("Unreadable reply: {message}")]
    Transformation { message: String },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    pub fn transformation(message: impl Into<String>) -> Self {
        Self::Transformation { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Whether the same call may succeed if repeated later
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::Timeout { .. }
                | Self::RateLimited { .. }
                | Self::ServiceUnavailable { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Wait the service asked for, if any
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}

/// Supertrait of every port: shareable across tasks
pub trait DomainPort: Send + Sync + 'static {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    /// Reachable but answering with errors
    Degraded,
    Unhealthy,
}

/// Outcome of probing one adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    pub fn now(adapter_id: impl Into<String>, status: AdapterHealth, message: Option<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status,
            message,
            checked_at: Utc::now(),
        }
    }
}

/// Adapters that can probe their backend
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}
