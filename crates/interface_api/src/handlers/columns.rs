//! Column registry handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use validator::Validate;

use domain_document::{Column, ColumnDefinition, Workspace};
use infra_store::StoreKey;

use crate::dto::columns::*;
use crate::{error::ApiError, AppState};

/// Column edits touch the registry and the open document's items
const COLUMN_PARTS: [StoreKey; 2] = [StoreKey::Columns, StoreKey::CurrentDocument];

fn columns_of(workspace: &Workspace) -> Vec<Column> {
    workspace.column_registry.iter().cloned().collect()
}

/// Lists registered columns in display order
pub async fn list_columns(State(state): State<AppState>) -> Json<Vec<Column>> {
    let workspace = state.workspace.lock().await;
    Json(columns_of(&workspace))
}

/// Registers a column
pub async fn create_column(
    State(state): State<AppState>,
    Json(request): Json<CreateColumnRequest>,
) -> Result<(StatusCode, Json<CreateColumnResponse>), ApiError> {
    request.validate()?;
    let (key, columns) = state
        .commit(&COLUMN_PARTS, |workspace| {
            let key = workspace.add_column(request.into())?;
            Ok((key, columns_of(workspace)))
        })
        .await?;

    info!(key = %key, "Column created");
    Ok((
        StatusCode::CREATED,
        Json(CreateColumnResponse {
            key,
            columns,
        }),
    ))
}

/// Edits a column's label, type, input or options
pub async fn update_column(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<UpdateColumnRequest>,
) -> Result<Json<ColumnDefinition>, ApiError> {
    request.validate()?;
    let definition = state
        .commit(&COLUMN_PARTS, |workspace| Ok(workspace.update_column(&key, request.into())?))
        .await?;
    Ok(Json(definition))
}

/// Deletes a user-defined column
pub async fn delete_column(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .commit(&COLUMN_PARTS, |workspace| Ok(workspace.remove_column(&key)?))
        .await?;

    info!(key = %key, "Column deleted");
    Ok(StatusCode::NO_CONTENT)
}
