//! Company DTOs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::CompanyId;
use domain_document::Company;

fn named(company: &Company) -> Result<(), ValidationError> {
    if company.name.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("company name is required".into());
        return Err(error);
    }
    Ok(())
}

/// A full company profile as sent by the client
#[derive(Debug, Deserialize, Validate)]
#[serde(transparent)]
pub struct CompanyRequest {
    #[validate(custom(function = "named"))]
    pub company: Company,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListResponse {
    pub active_company_id: Option<CompanyId>,
    pub companies: Vec<Company>,
}
