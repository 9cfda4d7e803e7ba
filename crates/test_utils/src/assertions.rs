//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for monetary figures that give
//! more meaningful error messages than standard assertions.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Tolerance used for figures that went through a division
pub const CENT_FRACTION: Decimal = dec!(0.000001);

/// Asserts that two decimals are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the values differ by more than `tolerance`
pub fn assert_decimal_approx_eq(actual: Decimal, expected: Decimal, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Values differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts that parts sum to a total within a tolerance
pub fn assert_sums_to(parts: &[Decimal], total: Decimal, tolerance: Decimal) {
    let sum: Decimal = parts.iter().copied().sum();
    assert!(
        (sum - total).abs() <= tolerance,
        "Parts sum to {} but expected {} (tolerance {})",
        sum,
        total,
        tolerance
    );
}
