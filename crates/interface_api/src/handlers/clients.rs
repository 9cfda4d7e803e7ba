//! Saved client handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use core_kernel::ClientId;
use domain_document::ClientInfo;
use infra_store::StoreKey;

use crate::{error::ApiError, AppState};

pub async fn list_clients(State(state): State<AppState>) -> Json<Vec<ClientInfo>> {
    let workspace = state.workspace.lock().await;
    Json(workspace.saved_clients.clone())
}

/// Saves a client, replacing any stored client with the same id
pub async fn save_client(
    State(state): State<AppState>,
    Json(client): Json<ClientInfo>,
) -> Result<Json<ClientInfo>, ApiError> {
    state
        .commit(&[StoreKey::Clients], |workspace| Ok(workspace.save_client(client.clone())?))
        .await?;
    Ok(Json(client))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<ClientId>,
) -> Result<StatusCode, ApiError> {
    state
        .commit(&[StoreKey::Clients], |workspace| Ok(workspace.delete_client(id)?))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
