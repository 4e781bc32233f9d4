//! Field normalization (spec §4.5 step 3): trim strings, parse dates
//! across a whitelisted set of formats plus RFC3339, parse currency
//! strings tolerant of `$` and thousands separators.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Formats accepted in addition to RFC3339-with-offset, in the order
/// they're tried. Government CSV exports mix `MM/dd/yyyy`, `yyyy-MM-dd`,
/// and the SAM.gov `MM/dd/yyyy HH:mm:ss` convention.
const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"];
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];

pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

pub fn trim_opt(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses a date across the whitelisted formats plus ISO8601-with-offset,
/// normalizing the result to UTC. Returns `None` for blank/unparseable
/// input rather than erroring — a malformed date is a missing date, not
/// a fatal ingestion failure.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        }
    }

    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            let dt = date.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        }
    }

    None
}

/// Strips `$` and thousands-separating commas and coerces to a decimal;
/// invalid input coerces to zero rather than failing the whole row.
pub fn parse_currency(raw: &str) -> Decimal {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    Decimal::from_str(cleaned.trim()).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_date("2026-07-27T12:00:00-04:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-07-27T16:00:00+00:00");
    }

    #[test]
    fn parses_slash_date_format() {
        assert!(parse_date("07/27/2026").is_some());
    }

    #[test]
    fn blank_date_is_none() {
        assert!(parse_date("   ").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn unparseable_date_is_none_not_error() {
        assert!(parse_date("not a date").is_none());
    }

    #[test]
    fn currency_strips_dollar_and_commas() {
        assert_eq!(parse_currency("$1,234,567.89"), Decimal::from_str("1234567.89").unwrap());
    }

    #[test]
    fn invalid_currency_coerces_to_zero() {
        assert_eq!(parse_currency("n/a"), Decimal::ZERO);
    }

    #[test]
    fn trim_opt_returns_none_for_blank() {
        assert_eq!(trim_opt("   "), None);
        assert_eq!(trim_opt(" value "), Some("value".to_string()));
    }
}
