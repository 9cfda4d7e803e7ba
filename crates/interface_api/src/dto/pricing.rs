//! Pricing DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{format_amount, Currency};
use domain_document::PaymentPlanConfig;
use domain_pricing::{DocumentPricing, PaymentOption, Totals};

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = ValidationError::new("non_negative");
        error.message = Some("must not be negative".into());
        return Err(error);
    }
    Ok(())
}

/// Totals rendered in the document currency
#[derive(Debug, Serialize)]
pub struct FormattedTotals {
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

impl FormattedTotals {
    pub fn new(totals: &Totals, currency: Currency) -> Self {
        Self {
            subtotal: format_amount(totals.subtotal, currency),
            tax: format_amount(totals.tax, currency),
            total: format_amount(totals.total, currency),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPreviewResponse {
    pub currency: &'static str,
    #[serde(flatten)]
    pub pricing: DocumentPricing,
    pub formatted: FormattedTotals,
}

impl PricingPreviewResponse {
    pub fn new(pricing: DocumentPricing, currency: Currency) -> Self {
        let formatted = FormattedTotals::new(&pricing.totals, currency);
        Self {
            currency: currency.code(),
            pricing,
            formatted,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlanRequest {
    #[validate(custom(function = "non_negative"))]
    pub total: Decimal,
    #[serde(default)]
    pub currency: Currency,
    #[validate(nested)]
    pub config: PaymentPlanConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOptionResponse {
    #[serde(flatten)]
    pub option: PaymentOption,
    /// e.g. "12 months"
    pub label: String,
    pub formatted_payment: String,
    pub formatted_total: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlanResponse {
    /// Column header for the installment amount, e.g. "Monthly payment"
    pub payment_header: String,
    pub options: Vec<PaymentOptionResponse>,
}

impl PaymentPlanResponse {
    pub fn new(options: Vec<PaymentOption>, config: &PaymentPlanConfig, currency: Currency) -> Self {
        let period = config.payment_period;
        Self {
            payment_header: format!("{} payment", period.adjective()),
            options: options
                .into_iter()
                .map(|option| PaymentOptionResponse {
                    label: format!("{} {}", option.term, period.unit_label(option.term)),
                    formatted_payment: format_amount(option.monthly_payment, currency),
                    formatted_total: format_amount(option.total_payment, currency),
                    option,
                })
                .collect(),
        }
    }
}
