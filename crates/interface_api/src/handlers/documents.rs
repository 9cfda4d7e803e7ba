//! Document handlers
//!
//! "Current" is the document open for editing; saved documents are snapshots
//! that can be reopened.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use tracing::info;
use validator::Validate;

use core_kernel::{CategoryId, DocumentId};
use domain_document::{DocumentError, DocumentState};
use domain_pricing::apply_markup_as_line_item;
use infra_store::StoreKey;

use crate::dto::documents::*;
use crate::{error::ApiError, AppState};

/// Lists saved documents
pub async fn list_documents(State(state): State<AppState>) -> Json<Vec<DocumentSummary>> {
    let workspace = state.workspace.lock().await;
    Json(workspace.saved_documents.iter().map(DocumentSummary::from).collect())
}

/// Opens a fresh document from the active company's template
pub async fn new_document(
    State(state): State<AppState>,
    Json(request): Json<NewDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let today = request.issue_date.unwrap_or_else(|| Local::now().date_naive());
    let document = state
        .commit(&[StoreKey::CurrentDocument], |workspace| {
            Ok(workspace.new_document(request.doc_type, today)?.clone())
        })
        .await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::new(document))))
}

pub async fn get_current(State(state): State<AppState>) -> Result<Json<DocumentResponse>, ApiError> {
    let workspace = state.workspace.lock().await;
    let document = workspace.current_document()?.clone();
    Ok(Json(DocumentResponse::new(document)))
}

/// Replaces the open document with an edited copy
pub async fn replace_current(
    State(state): State<AppState>,
    Json(document): Json<DocumentState>,
) -> Result<Json<DocumentResponse>, ApiError> {
    if let Some(plan) = &document.payment_plan {
        plan.validate()?;
    }
    state
        .commit(&[StoreKey::CurrentDocument], |workspace| {
            workspace.company_for(&document)?;
            workspace.set_current_document(document.clone());
            Ok(())
        })
        .await?;
    Ok(Json(DocumentResponse::new(document)))
}

/// Saves the open document, advancing its company's folio counter
pub async fn save_current(State(state): State<AppState>) -> Result<Json<DocumentSummary>, ApiError> {
    let summary = state
        .commit(&[StoreKey::Documents, StoreKey::Companies], |workspace| {
            let document = workspace.current_document()?.clone();
            let summary = DocumentSummary::from(&document);
            workspace.save_document(document)?;
            Ok(summary)
        })
        .await?;

    info!(document_id = %summary.id, doc_number = %summary.doc_number, "Document saved");
    Ok(Json(summary))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<DocumentId>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let workspace = state.workspace.lock().await;
    let document = workspace.document(id)?.clone();
    Ok(Json(DocumentResponse::new(document)))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<DocumentId>,
) -> Result<StatusCode, ApiError> {
    state
        .commit(&[StoreKey::Documents], |workspace| Ok(workspace.delete_document(id)?))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Makes a saved document the current one
pub async fn open_document(
    State(state): State<AppState>,
    Path(id): Path<DocumentId>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let document = state
        .commit(&[StoreKey::CurrentDocument], |workspace| {
            Ok(workspace.open_document(id)?.clone())
        })
        .await?;
    Ok(Json(DocumentResponse::new(document)))
}

/// Turns the markup of the other categories into an item of this one
pub async fn apply_markup(
    State(state): State<AppState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<ApplyMarkupResponse>, ApiError> {
    let (item_id, document) = state
        .commit(&[StoreKey::CurrentDocument], |workspace| {
            let document = workspace
                .current_document
                .as_mut()
                .ok_or(DocumentError::NoCurrentDocument)?;
            let item_id = apply_markup_as_line_item(document, category_id, &workspace.column_registry)?;
            Ok((item_id, document.clone()))
        })
        .await?;

    Ok(Json(ApplyMarkupResponse {
        item_id,
        document: DocumentResponse::new(document),
    }))
}
