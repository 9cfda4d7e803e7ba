//! Company handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::CompanyId;
use domain_document::{Company, Workspace};
use infra_store::StoreKey;

use crate::dto::companies::*;
use crate::{error::ApiError, AppState};

const COMPANY_PARTS: [StoreKey; 2] = [StoreKey::Companies, StoreKey::ActiveCompany];

fn listing(workspace: &Workspace) -> CompanyListResponse {
    CompanyListResponse {
        active_company_id: workspace.active_company_id,
        companies: workspace.companies.clone(),
    }
}

/// Lists companies and the active one
pub async fn list_companies(State(state): State<AppState>) -> Json<CompanyListResponse> {
    let workspace = state.workspace.lock().await;
    Json(listing(&workspace))
}

/// Adds a company profile
pub async fn create_company(
    State(state): State<AppState>,
    Json(request): Json<CompanyRequest>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    request.validate()?;
    let mut company = request.company;
    company.id = CompanyId::new();

    state
        .commit(&COMPANY_PARTS, |workspace| {
            workspace.add_company(company.clone());
            Ok(())
        })
        .await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// Replaces a company profile
pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<CompanyId>,
    Json(request): Json<CompanyRequest>,
) -> Result<Json<Company>, ApiError> {
    request.validate()?;
    let mut company = request.company;
    company.id = id;

    state
        .commit(&[StoreKey::Companies], |workspace| Ok(workspace.update_company(company.clone())?))
        .await?;
    Ok(Json(company))
}

/// Removes a company that is neither active nor the last one
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<CompanyId>,
) -> Result<StatusCode, ApiError> {
    state
        .commit(&COMPANY_PARTS, |workspace| Ok(workspace.remove_company(id)?))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Makes a company the one new documents are issued under
pub async fn activate_company(
    State(state): State<AppState>,
    Path(id): Path<CompanyId>,
) -> Result<Json<CompanyListResponse>, ApiError> {
    let response = state
        .commit(&[StoreKey::ActiveCompany], |workspace| {
            workspace.set_active_company(id)?;
            Ok(listing(workspace))
        })
        .await?;
    Ok(Json(response))
}
