//! Payment plan configuration
//!
//! The calculator lives in the pricing crate; this is the stored shape.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

/// Longest term offered, in installments
pub const MAX_PAYMENT_TERM: u32 = 600;

/// Unit used to label installments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentPeriod {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
    Quarterly,
}

impl PaymentPeriod {
    /// Label for a number of installments, e.g. "12 months"
    pub fn unit_label(&self, count: u32) -> &'static str {
        let plural = count != 1;
        match (self, plural) {
            (PaymentPeriod::Weekly, false) => "week",
            (PaymentPeriod::Weekly, true) => "weeks",
            (PaymentPeriod::Biweekly, false) => "fortnight",
            (PaymentPeriod::Biweekly, true) => "fortnights",
            (PaymentPeriod::Monthly, false) => "month",
            (PaymentPeriod::Monthly, true) => "months",
            (PaymentPeriod::Quarterly, false) => "quarter",
            (PaymentPeriod::Quarterly, true) => "quarters",
        }
    }

    /// Adjective used in table headers, e.g. "Monthly payment"
    pub fn adjective(&self) -> &'static str {
        match self {
            PaymentPeriod::Weekly => "Weekly",
            PaymentPeriod::Biweekly => "Biweekly",
            PaymentPeriod::Monthly => "Monthly",
            PaymentPeriod::Quarterly => "Quarterly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlanConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    #[validate(custom(function = "non_negative"))]
    pub down_payment: Decimal,
    #[serde(default)]
    pub payment_period: PaymentPeriod,
    /// Term lengths, deduplicated and ascending
    #[serde(default, deserialize_with = "deserialize_terms")]
    #[validate(custom(function = "terms_within_limit"))]
    terms: Vec<u32>,
    /// Annual percentage
    #[serde(default)]
    #[validate(custom(function = "percentage"))]
    pub base_interest_rate: Decimal,
    /// Annual percentage added per twelve installments
    #[serde(default)]
    #[validate(custom(function = "percentage"))]
    pub term_increment_rate: Decimal,
    /// Annual percentage
    #[serde(default)]
    #[validate(custom(function = "percentage"))]
    pub risk_factor: Decimal,
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(invalid("non_negative", "must not be negative"));
    }
    Ok(())
}

fn percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > dec!(100) {
        return Err(invalid("percentage", "must be between 0 and 100"));
    }
    Ok(())
}

fn terms_within_limit(terms: &Vec<u32>) -> Result<(), ValidationError> {
    if terms.iter().any(|&term| term > MAX_PAYMENT_TERM) {
        return Err(invalid("term_limit", "terms must not exceed 600 installments"));
    }
    Ok(())
}

fn deserialize_terms<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u32>, D::Error> {
    let mut terms = Vec::<u32>::deserialize(deserializer)?;
    normalize_terms(&mut terms);
    Ok(terms)
}

fn normalize_terms(terms: &mut Vec<u32>) {
    terms.sort_unstable();
    terms.dedup();
}

impl Default for PaymentPlanConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            down_payment: Decimal::ZERO,
            payment_period: PaymentPeriod::Monthly,
            terms: vec![3, 6, 12],
            base_interest_rate: Decimal::ZERO,
            term_increment_rate: Decimal::ZERO,
            risk_factor: Decimal::ZERO,
        }
    }
}

impl PaymentPlanConfig {
    pub fn terms(&self) -> &[u32] {
        &self.terms
    }

    /// Replaces the term list, deduplicating and sorting it
    pub fn set_terms(&mut self, terms: impl IntoIterator<Item = u32>) {
        self.terms = terms.into_iter().collect();
        normalize_terms(&mut self.terms);
    }

    /// Adds a term; returns false when it was already present
    pub fn add_term(&mut self, term: u32) -> bool {
        match self.terms.binary_search(&term) {
            Ok(_) => false,
            Err(pos) => {
                self.terms.insert(pos, term);
                true
            }
        }
    }

    pub fn remove_term(&mut self, term: u32) -> bool {
        match self.terms.binary_search(&term) {
            Ok(pos) => {
                self.terms.remove(pos);
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_stay_sorted_and_unique() {
        let mut config = PaymentPlanConfig::default();
        config.set_terms([12, 3, 12, 6]);
        assert_eq!(config.terms(), &[3, 6, 12]);

        assert!(config.add_term(9));
        assert!(!config.add_term(6));
        assert_eq!(config.terms(), &[3, 6, 9, 12]);

        assert!(config.remove_term(3));
        assert!(!config.remove_term(3));
        assert_eq!(config.terms(), &[6, 9, 12]);
    }

    #[test]
    fn test_deserialize_normalizes_terms() {
        let config: PaymentPlanConfig =
            serde_json::from_str(r#"{"enabled":true,"terms":[24,6,6,12]}"#).unwrap();
        assert_eq!(config.terms(), &[6, 12, 24]);
        assert!(config.enabled);
    }

    #[test]
    fn test_validation_bounds() {
        let mut config = PaymentPlanConfig::default();
        config.base_interest_rate = dec!(12);
        config.set_terms([12, MAX_PAYMENT_TERM]);
        assert!(config.validate().is_ok());

        config.risk_factor = dec!(100.5);
        config.down_payment = dec!(-1);
        config.add_term(MAX_PAYMENT_TERM + 1);
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 3);
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!(PaymentPeriod::Monthly.unit_label(1), "month");
        assert_eq!(PaymentPeriod::Biweekly.unit_label(12), "fortnights");
    }
}
