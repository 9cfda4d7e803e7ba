//! Payment plan calculator
//!
//! For each configured term `t`:
//!
//! ```text
//! annual  = base + risk + t × increment / 12
//! r       = annual / 100 / 12
//! payment = balance / t                              (r = 0)
//!         = balance × r × (1+r)^t / ((1+r)^t − 1)    (otherwise)
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::warn;

use domain_document::{PaymentPlanConfig, MAX_PAYMENT_TERM};

/// One financing option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOption {
    pub term: u32,
    pub monthly_payment: Decimal,
    pub total_payment: Decimal,
    /// Effective annual percentage used for this term
    pub annual_rate: Decimal,
}

/// Amount left to finance after the down payment; 0 on overflow
pub fn financed_balance(total: Decimal, config: &PaymentPlanConfig) -> Decimal {
    total.checked_sub(config.down_payment).unwrap_or(Decimal::ZERO)
}

/// Effective annual percentage for a term; `None` on overflow
pub fn annual_rate(config: &PaymentPlanConfig, term: u32) -> Option<Decimal> {
    let increment = Decimal::from(term)
        .checked_mul(config.term_increment_rate)?
        .checked_div(dec!(12))?;
    config
        .base_interest_rate
        .checked_add(config.risk_factor)?
        .checked_add(increment)
}

/// Options for every configured term, in ascending term order. Empty when the
/// plan is disabled, has no terms, or nothing remains to finance. Terms of 0
/// or above [`MAX_PAYMENT_TERM`] are skipped.
pub fn calculate_payment_plan(total: Decimal, config: &PaymentPlanConfig) -> Vec<PaymentOption> {
    if !config.enabled || config.terms().is_empty() {
        return Vec::new();
    }
    let balance = financed_balance(total, config);
    if balance <= Decimal::ZERO {
        return Vec::new();
    }

    config
        .terms()
        .iter()
        .filter(|&&term| term > 0)
        .filter(|&&term| {
            let allowed = term <= MAX_PAYMENT_TERM;
            if !allowed {
                warn!(term, max = MAX_PAYMENT_TERM, "Payment term above the limit, skipped");
            }
            allowed
        })
        .filter_map(|&term| {
            let option = payment_option(balance, config, term);
            if option.is_none() {
                warn!(term, balance = %balance, "Payment option overflowed, skipped");
            }
            option
        })
        .collect()
}

fn payment_option(balance: Decimal, config: &PaymentPlanConfig, term: u32) -> Option<PaymentOption> {
    let annual = annual_rate(config, term)?;
    let monthly_rate = annual.checked_div(dec!(1200))?;
    let periods = Decimal::from(term);

    if monthly_rate.is_zero() {
        return Some(PaymentOption {
            term,
            monthly_payment: balance.checked_div(periods)?,
            total_payment: balance,
            annual_rate: annual,
        });
    }

    let growth = compound(Decimal::ONE.checked_add(monthly_rate)?, term)?;
    let denominator = growth.checked_sub(Decimal::ONE)?;
    let monthly_payment = if denominator.is_zero() {
        balance.checked_div(periods)?
    } else {
        balance
            .checked_mul(monthly_rate)?
            .checked_mul(growth)?
            .checked_div(denominator)?
    };

    Some(PaymentOption {
        term,
        monthly_payment,
        total_payment: monthly_payment.checked_mul(periods)?,
        annual_rate: annual,
    })
}

/// `base^exponent` by squaring; `None` on overflow
fn compound(base: Decimal, exponent: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut square = base;
    let mut remaining = exponent;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = result.checked_mul(square)?;
        }
        remaining >>= 1;
        if remaining > 0 {
            square = square.checked_mul(square)?;
        }
    }
    Some(result)
}
