//! Drafting assistant handlers
//!
//! The workspace lock is released while the completion service is awaited;
//! suggestions are applied to whatever the current document is once they
//! arrive.

use axum::{extract::State, Json};
use validator::Validate;

use domain_assistant::{apply_bulk, apply_items, ImageAttachment};
use domain_document::{ColumnRegistry, Company, DocumentError};
use infra_store::StoreKey;

use crate::dto::assistant::*;
use crate::dto::documents::DocumentResponse;
use crate::{error::ApiError, AppState};

/// Active company and registry at the time of the request
async fn context(state: &AppState) -> (Option<Company>, ColumnRegistry) {
    let workspace = state.workspace.lock().await;
    (
        workspace.active_company().ok().cloned(),
        workspace.column_registry.clone(),
    )
}

/// Drafts a description or terms text
pub async fn suggest_text(
    State(state): State<AppState>,
    Json(request): Json<TextSuggestionRequest>,
) -> Result<Json<TextSuggestionResponse>, ApiError> {
    request.validate()?;
    let kind = request.kind;
    let suggestion = request.body.into_request()?;
    let (company, _) = context(&state).await;

    let text = match kind {
        TextKind::Description => {
            state
                .assistant
                .suggest_description(&suggestion, company.as_ref())
                .await?
        }
        TextKind::Terms => state.assistant.suggest_terms(&suggestion, company.as_ref()).await?,
    };
    Ok(Json(TextSuggestionResponse { kind, text }))
}

/// Drafts items, optionally appending them to a subcategory of the current
/// document
pub async fn suggest_items(
    State(state): State<AppState>,
    Json(request): Json<ItemSuggestionRequest>,
) -> Result<Json<ItemSuggestionResponse>, ApiError> {
    request.validate()?;
    let target = request.target;
    let suggestion = request.body.into_request()?;
    let (company, registry) = context(&state).await;

    let items = state
        .assistant
        .suggest_items(&suggestion, company.as_ref(), &registry)
        .await?;

    let Some(target) = target else {
        return Ok(Json(ItemSuggestionResponse {
            items,
            inserted: Vec::new(),
            document: None,
        }));
    };

    let (inserted, document) = state
        .commit(&[StoreKey::CurrentDocument], |workspace| {
            let document = workspace
                .current_document
                .as_mut()
                .ok_or(DocumentError::NoCurrentDocument)?;
            let inserted = apply_items(
                document,
                target.category_id,
                target.subcategory_id,
                items.clone(),
                &workspace.column_registry,
            )?;
            Ok((inserted, document.clone()))
        })
        .await?;

    Ok(Json(ItemSuggestionResponse {
        items,
        inserted,
        document: Some(DocumentResponse::new(document)),
    }))
}

/// Drafts items grouped by category, optionally distributing them over the
/// current document
pub async fn suggest_bulk(
    State(state): State<AppState>,
    Json(request): Json<BulkSuggestionRequest>,
) -> Result<Json<BulkSuggestionResponse>, ApiError> {
    request.validate()?;
    let apply = request.apply;
    let suggestion = request.body.into_request()?;
    let (company, registry) = context(&state).await;

    let categories = state
        .assistant
        .suggest_bulk(&suggestion, company.as_ref(), &registry)
        .await?;

    if !apply {
        return Ok(Json(BulkSuggestionResponse {
            categories,
            outcome: None,
            document: None,
        }));
    }

    let (outcome, document) = state
        .commit(&[StoreKey::CurrentDocument], |workspace| {
            let document = workspace
                .current_document
                .as_mut()
                .ok_or(DocumentError::NoCurrentDocument)?;
            let outcome = apply_bulk(document, categories.clone(), &workspace.column_registry)?;
            Ok((outcome, document.clone()))
        })
        .await?;

    Ok(Json(BulkSuggestionResponse {
        categories,
        outcome: Some(outcome),
        document: Some(DocumentResponse::new(document)),
    }))
}

/// Reads a receipt photo. With a `ticketId` the photo may come from that
/// ticket of the current document, and the result is stored on it.
pub async fn interpret_receipt(
    State(state): State<AppState>,
    Json(request): Json<ReceiptRequest>,
) -> Result<Json<ReceiptResponse>, ApiError> {
    request.validate()?;
    let ticket_id = request.ticket_id;
    let mut suggestion = request.body.into_request()?;

    if let (Some(id), true) = (ticket_id, suggestion.images.is_empty()) {
        let workspace = state.workspace.lock().await;
        let image = workspace
            .current_document()?
            .third_party_tickets
            .iter()
            .find(|t| t.id == id)
            .and_then(|t| ImageAttachment::from_data_url(&t.image));
        suggestion.images.extend(image);
    }

    let receipt = state.assistant.interpret_receipt(&suggestion).await?;

    let Some(id) = ticket_id else {
        return Ok(Json(ReceiptResponse {
            receipt,
            attached: false,
        }));
    };

    state
        .commit(&[StoreKey::CurrentDocument], |workspace| {
            let ticket = workspace
                .current_document_mut()?
                .third_party_tickets
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| ApiError::NotFound(format!("Ticket not found: {}", id)))?;
            ticket.interpreted = Some(receipt.clone());
            Ok(())
        })
        .await?;

    Ok(Json(ReceiptResponse {
        receipt,
        attached: true,
    }))
}
