//! Third-party ticket handlers

use axum::{extract::State, Json};
use tracing::{info, warn};
use validator::Validate;

use domain_document::{content_hash, ThirdPartyTicket};
use infra_store::StoreKey;

use crate::dto::tickets::*;
use crate::{error::ApiError, AppState};

/// Hashes an uploaded ticket and reports whether it was imported before.
/// With `attach`, the ticket is added to the current document and its hash
/// remembered; duplicates are still accepted.
pub async fn check_ticket(
    State(state): State<AppState>,
    Json(request): Json<TicketCheckRequest>,
) -> Result<Json<TicketCheckResponse>, ApiError> {
    request.validate()?;
    let (mime_type, bytes) = request.decode()?;
    let hash = content_hash(&bytes);

    if !request.attach {
        let duplicate = state.workspace.lock().await.is_known_ticket(&hash);
        return Ok(Json(TicketCheckResponse {
            content_hash: hash,
            duplicate,
            ticket_id: None,
        }));
    }

    let ticket = ThirdPartyTicket::from_upload(&request.file_name, &mime_type, &bytes);
    let ticket_id = ticket.id;
    let duplicate = state
        .commit(&[StoreKey::CurrentDocument, StoreKey::TicketHashes], |workspace| {
            workspace.current_document()?;
            let duplicate = workspace.register_ticket_hash(&hash);
            workspace.current_document_mut()?.third_party_tickets.push(ticket);
            Ok(duplicate)
        })
        .await?;

    if duplicate {
        warn!(file_name = %request.file_name, "Duplicate ticket attached");
    } else {
        info!(file_name = %request.file_name, ticket_id = %ticket_id, "Ticket attached");
    }
    Ok(Json(TicketCheckResponse {
        content_hash: hash,
        duplicate,
        ticket_id: Some(ticket_id),
    }))
}
