//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domain_assistant::AssistantError;
use domain_document::{ColumnError, DocumentError};
use domain_pricing::PricingError;
use export_pdf::ExportError;
use infra_store::StoreError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Validation failures of a request body, one message per field
    #[error("Invalid request")]
    InvalidFields(Vec<String>),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) | ApiError::InvalidFields(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            ApiError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            ApiError::Internal(_) | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::Validation(msg) => ("validation_error", msg, None),
            ApiError::InvalidFields(fields) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(fields),
            ),
            ApiError::ExternalService(msg) => ("external_service_error", msg, None),
            ApiError::NotImplemented(msg) => ("not_implemented", msg, None),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                ("internal_error", msg, None)
            }
            ApiError::Storage(msg) => {
                error!(error = %msg, "Workspace could not be persisted");
                ("storage_error", msg, None)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ColumnError> for ApiError {
    fn from(err: ColumnError) -> Self {
        match err {
            ColumnError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ColumnError::DuplicateKey(_) | ColumnError::Protected(_) | ColumnError::LastColumn => {
                ApiError::Conflict(err.to_string())
            }
            ColumnError::EmptyLabel
            | ColumnError::IncompatibleInput { .. }
            | ColumnError::MissingOptions(_)
            | ColumnError::FixedColumn(_) => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Column(e) => e.into(),
            DocumentError::CategoryNotFound(_)
            | DocumentError::SubcategoryNotFound(_)
            | DocumentError::ItemNotFound(_)
            | DocumentError::CompanyNotFound(_)
            | DocumentError::DocumentNotFound(_)
            | DocumentError::ClientNotFound(_)
            | DocumentError::NoCurrentDocument
            | DocumentError::NoActiveCompany => ApiError::NotFound(err.to_string()),
            DocumentError::LastSubcategory
            | DocumentError::ActiveCompanyRemoval
            | DocumentError::LastCompany => ApiError::Conflict(err.to_string()),
            DocumentError::DerivedField(_)
            | DocumentError::UnknownColumn(_)
            | DocumentError::Validation(_) => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::Document(e) => e.into(),
            PricingError::CategoryNotFound(_) => ApiError::NotFound(err.to_string()),
            PricingError::NoSubcategory(_) => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Unsupported(_) => ApiError::NotImplemented(err.to_string()),
            ExportError::Pdf(_) | ExportError::Font(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::Document(e) => e.into(),
            AssistantError::EmptyPrompt | AssistantError::MissingImage => {
                ApiError::Validation(err.to_string())
            }
            AssistantError::Port(_) | AssistantError::MalformedResponse(_) => {
                ApiError::ExternalService(err.to_string())
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        details.sort();
        ApiError::InvalidFields(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{CompanyId, PortError};

    #[test]
    fn test_domain_errors_map_to_status() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (DocumentError::LastCompany.into(), StatusCode::CONFLICT),
            (DocumentError::CompanyNotFound(CompanyId::new()).into(), StatusCode::NOT_FOUND),
            (DocumentError::validation("bad").into(), StatusCode::UNPROCESSABLE_ENTITY),
            (ColumnError::Protected("unit".into()).into(), StatusCode::CONFLICT),
            (
                DocumentError::Column(ColumnError::NotFound("x".into())).into(),
                StatusCode::NOT_FOUND,
            ),
            (AssistantError::EmptyPrompt.into(), StatusCode::UNPROCESSABLE_ENTITY),
            (
                AssistantError::Port(PortError::connection("down")).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (ExportError::Unsupported("Word").into(), StatusCode::NOT_IMPLEMENTED),
        ];

        for (error, status) in cases {
            assert_eq!(error.status(), status, "{error}");
        }
    }
}
