//! Tests for currency formatting and rates

use core_kernel::{format_amount, Currency, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod rounding {
    use super::*;

    #[test]
    fn test_default_currency_is_mxn() {
        assert_eq!(Currency::default(), Currency::MXN);
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        assert_eq!(format_amount(dec!(10.125), Currency::MXN), "$10.13");
        assert_eq!(format_amount(dec!(-10.125), Currency::MXN), "-$10.13");
    }

    #[test]
    fn test_sub_cent_amounts() {
        assert_eq!(format_amount(dec!(0.004), Currency::MXN), "$0.00");
        assert_eq!(format_amount(dec!(0.005), Currency::MXN), "$0.01");
    }
}

mod display {
    use super::*;

    #[test]
    fn test_display_mxn() {
        assert_eq!(format_amount(dec!(1234.5), Currency::MXN), "$1,234.50");
    }

    #[test]
    fn test_display_usd_prefix() {
        assert_eq!(format_amount(dec!(12), Currency::USD), "US$12.00");
    }

    #[test]
    fn test_large_amount_grouping() {
        assert_eq!(format_amount(dec!(1000000000), Currency::EUR), "€1,000,000,000.00");
    }

    #[test]
    fn test_small_amount_no_grouping() {
        assert_eq!(format_amount(dec!(0.5), Currency::MXN), "$0.50");
    }

    #[test]
    fn test_clp_has_no_decimals() {
        assert_eq!(format_amount(dec!(15999.5), Currency::CLP), "CLP$16,000");
    }
}

mod currency {
    use super::*;

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::MXN.code(), "MXN");
        assert_eq!(Currency::PEN.code(), "PEN");
        assert_eq!(Currency::JPY.to_string(), "JPY");
    }

    #[test]
    fn test_currency_json_roundtrip() {
        let json = serde_json::to_string(&Currency::MXN).unwrap();
        assert_eq!(json, "\"MXN\"");
        let back: Currency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Currency::MXN);
    }
}

mod rate {
    use super::*;

    #[test]
    fn test_rate_from_percentage() {
        let rate = Rate::from_percentage(dec!(16));
        assert_eq!(rate.as_decimal(), dec!(0.16));
        assert_eq!(rate.as_percentage(), dec!(16));
    }

    #[test]
    fn test_rate_of_zero_amount() {
        assert_eq!(Rate::from_percentage(dec!(16)).of(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(Rate::new(dec!(0.085)).to_string(), "8.5%");
    }
}
