//! Currencies, money formatting and percentage rates
//!
//! Amounts are plain `rust_decimal::Decimal`s; this module decides how they
//! are shown. The live preview, the API and the PDF export all format through
//! [`format_amount`].

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    MXN,
    USD,
    EUR,
    GBP,
    CAD,
    COP,
    CLP,
    ARS,
    PEN,
    JPY,
}

impl Default for Currency {
    fn default() -> Self {
        Currency::MXN
    }
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY | Currency::CLP => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::MXN => "$",
            Currency::USD => "US$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::CAD => "C$",
            Currency::COP => "COL$",
            Currency::CLP => "CLP$",
            Currency::ARS => "AR$",
            Currency::PEN => "S/",
            Currency::JPY => "¥",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::MXN => "MXN",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::CAD => "CAD",
            Currency::COP => "COP",
            Currency::CLP => "CLP",
            Currency::ARS => "ARS",
            Currency::PEN => "PEN",
            Currency::JPY => "JPY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Formats an amount the way every document surface shows money:
/// currency symbol, thousands separators and the currency's decimal places.
///
/// Midpoints round away from zero, so `0.125` becomes `$0.13`.
pub fn format_amount(amount: Decimal, currency: Currency) -> String {
    let dp = currency.decimal_places();
    let rounded = amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let digits = format!("{:.dp$}", rounded.abs(), dp = dp as usize);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(currency.symbol());
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Represents a percentage rate (e.g., VAT rate, markup rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.16 for 16%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.16 for 16%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (e.g., 16.0 for 16%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Applies this rate to a raw amount
    pub fn of(&self, amount: Decimal) -> Decimal {
        amount * self.value
    }

    /// Like [`Rate::of`], but `None` when the product overflows
    pub fn checked_of(&self, amount: Decimal) -> Option<Decimal> {
        amount.checked_mul(self.value)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4).normalize())
    }
}
