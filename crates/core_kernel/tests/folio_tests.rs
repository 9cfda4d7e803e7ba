//! Tests for folio generation and parsing

use chrono::NaiveDate;
use core_kernel::folio::{generate_folio, julian_suffix, parse_folio_sequence, FolioError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod generation {
    use super::*;

    #[test]
    fn test_quote_folio() {
        assert_eq!(generate_folio("COT-", 7, date(2024, 3, 5)), "COT-000007-24065");
    }

    #[test]
    fn test_first_day_of_year() {
        assert_eq!(generate_folio("X-", 1, date(2024, 1, 1)), "X-000001-24001");
    }

    #[test]
    fn test_empty_prefix() {
        assert_eq!(generate_folio("", 12, date(2025, 2, 1)), "000012-25032");
    }

    #[test]
    fn test_sequence_wider_than_padding_is_not_truncated() {
        assert_eq!(generate_folio("F-", 1_234_567, date(2030, 7, 4)), "F-1234567-30185");
    }

    #[test]
    fn test_century_rollover_uses_two_digits() {
        assert_eq!(julian_suffix(date(2100, 1, 9)), "00009");
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_folio("COT-", 99, date(2024, 6, 30));
        let b = generate_folio("COT-", 99, date(2024, 6, 30));
        assert_eq!(a, b);
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_round_trip() {
        let folio = generate_folio("FAC-", 314, date(2024, 11, 2));
        assert_eq!(parse_folio_sequence(&folio, "FAC-"), Ok(314));
    }

    #[test]
    fn test_wrong_prefix() {
        let result = parse_folio_sequence("COT-000001-24001", "FAC-");
        assert!(matches!(result, Err(FolioError::PrefixMismatch { .. })));
    }

    #[test]
    fn test_non_numeric_sequence() {
        let result = parse_folio_sequence("COT-ABC-24001", "COT-");
        assert!(matches!(result, Err(FolioError::MissingSequence(_))));
    }

    #[test]
    fn test_manual_folio_without_suffix() {
        assert_eq!(parse_folio_sequence("COT-000045", "COT-"), Ok(45));
    }
}
