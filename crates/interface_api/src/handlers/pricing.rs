//! Pricing handlers
//!
//! Stateless: both endpoints price whatever they are sent.

use axum::Json;
use validator::Validate;

use domain_document::DocumentState;
use domain_pricing::{calculate_payment_plan, DocumentPricing};

use crate::dto::pricing::*;
use crate::error::ApiError;

/// Computes every figure of a document
pub async fn preview(Json(document): Json<DocumentState>) -> Json<PricingPreviewResponse> {
    let pricing = DocumentPricing::compute(&document);
    Json(PricingPreviewResponse::new(pricing, document.currency))
}

/// Financing options for a total
pub async fn payment_plan(
    Json(request): Json<PaymentPlanRequest>,
) -> Result<Json<PaymentPlanResponse>, ApiError> {
    request.validate()?;
    let options = calculate_payment_plan(request.total, &request.config);
    Ok(Json(PaymentPlanResponse::new(options, &request.config, request.currency)))
}
