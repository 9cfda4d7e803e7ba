//! Folio (sequential document number) generation
//!
//! A folio is `{prefix}{sequence:06}-{yy}{ddd}`: the company's prefix for the
//! document type, the zero-padded sequence counter, and a Julian-date suffix
//! (two-digit year followed by the three-digit day of the year).

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Width of the zero-padded sequence segment
pub const SEQUENCE_WIDTH: usize = 6;

/// Errors raised while reading a folio back
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FolioError {
    #[error("Folio '{folio}' does not start with prefix '{prefix}'")]
    PrefixMismatch { folio: String, prefix: String },

    #[error("Folio '{0}' has no numeric sequence")]
    MissingSequence(String),
}

/// Returns the Julian-date suffix for a date, e.g. 2024-03-05 -> `24065`
pub fn julian_suffix(date: NaiveDate) -> String {
    format!("{:02}{:03}", date.year().rem_euclid(100), date.ordinal())
}

/// Generates a folio for the given prefix, sequence and issue date
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use core_kernel::folio::generate_folio;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// assert_eq!(generate_folio("COT-", 7, date), "COT-000007-24065");
/// ```
pub fn generate_folio(prefix: &str, sequence: u64, date: NaiveDate) -> String {
    format!(
        "{prefix}{sequence:0width$}-{suffix}",
        width = SEQUENCE_WIDTH,
        suffix = julian_suffix(date)
    )
}

/// Recovers the sequence number from a folio produced by [`generate_folio`]
pub fn parse_folio_sequence(folio: &str, prefix: &str) -> Result<u64, FolioError> {
    let rest = folio
        .strip_prefix(prefix)
        .ok_or_else(|| FolioError::PrefixMismatch {
            folio: folio.to_string(),
            prefix: prefix.to_string(),
        })?;

    let digits = rest.split('-').next().unwrap_or_default();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(FolioError::MissingSequence(folio.to_string()));
    }

    digits
        .parse()
        .map_err(|_| FolioError::MissingSequence(folio.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_generate_folio_examples() {
        assert_eq!(generate_folio("COT-", 7, date(2024, 3, 5)), "COT-000007-24065");
        assert_eq!(generate_folio("X-", 1, date(2024, 1, 1)), "X-000001-24001");
    }

    #[test]
    fn test_leap_year_end_of_year() {
        assert_eq!(julian_suffix(date(2024, 12, 31)), "24366");
        assert_eq!(julian_suffix(date(2023, 12, 31)), "23365");
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_folio_sequence("COT-000042-24065", "COT-"), Ok(42));
        assert!(matches!(
            parse_folio_sequence("FAC-000042-24065", "COT-"),
            Err(FolioError::PrefixMismatch { .. })
        ));
        assert!(matches!(
            parse_folio_sequence("COT--24065", "COT-"),
            Err(FolioError::MissingSequence(_))
        ));
    }
}
