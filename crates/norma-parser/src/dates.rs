//! Domain date-token parsing.
//!
//! Wire dates come in two fixed-width shapes: `YYYYMMDD` and
//! `YYYYMMDDTHHMMSSZ`. Anything else is rejected rather than guessed at —
//! a truncated or reformatted token is a signal something upstream changed,
//! not something to silently coerce.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::ParserError;

const DATE_LEN: usize = 8;
const DATETIME_LEN: usize = 16;

/// Parse an 8-digit `YYYYMMDD` token as midnight UTC.
///
/// # Errors
///
/// Returns `ParserError::MalformedDate` if `raw` is not exactly 8 ASCII
/// digits or does not form a valid calendar date.
pub fn parse_wire_date(raw: &str) -> Result<DateTime<Utc>, ParserError> {
    if raw.len() != DATE_LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParserError::MalformedDate(raw.to_string()));
    }
    let naive = NaiveDate::parse_from_str(raw, "%Y%m%d").map_err(|_| ParserError::MalformedDate(raw.to_string()))?;
    Ok(naive.and_hms_opt(0, 0, 0).expect("midnight always valid").and_utc())
}

/// Parse a `YYYYMMDDTHHMMSSZ` token.
///
/// # Errors
///
/// Returns `ParserError::MalformedDate` if `raw` is not exactly 16 ASCII
/// characters in that shape or does not form a valid instant.
pub fn parse_wire_datetime(raw: &str) -> Result<DateTime<Utc>, ParserError> {
    if raw.len() != DATETIME_LEN || raw.as_bytes()[8] != b'T' || raw.as_bytes()[15] != b'Z' {
        return Err(ParserError::MalformedDate(raw.to_string()));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%SZ")
        .map_err(|_| ParserError::MalformedDate(raw.to_string()))?;
    Ok(naive.and_utc())
}

/// Parse either wire shape, dispatching on length.
///
/// # Errors
///
/// Returns `ParserError::MalformedDate` if `raw` matches neither shape.
pub fn parse_wire_any(raw: &str) -> Result<DateTime<Utc>, ParserError> {
    match raw.len() {
        DATE_LEN => parse_wire_date(raw),
        DATETIME_LEN => parse_wire_datetime(raw),
        _ => Err(ParserError::MalformedDate(raw.to_string())),
    }
}

/// Convert a CLI-facing `YYYY-MM-DD` date into the wire `YYYYMMDD` token by
/// stripping dashes, validating the result is a real calendar date first.
///
/// # Errors
///
/// Returns `ParserError::MalformedDate` if `cli_date` is not a valid
/// `YYYY-MM-DD` date.
pub fn cli_date_to_wire(cli_date: &str) -> Result<String, ParserError> {
    NaiveDate::parse_from_str(cli_date, "%Y-%m-%d").map_err(|_| ParserError::MalformedDate(cli_date.to_string()))?;
    Ok(cli_date.replace('-', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_date_only_token() {
        let dt = parse_wire_date("20260115").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-15T00:00:00+00:00");
    }

    #[test]
    fn parses_datetime_token() {
        let dt = parse_wire_datetime("20260115T143000Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-01-15T14:30:00+00:00");
    }

    #[test]
    fn rejects_wrong_width() {
        assert!(parse_wire_date("2026-01-15").is_err());
        assert!(parse_wire_date("202601150").is_err());
        assert!(parse_wire_datetime("20260115143000").is_err());
    }

    #[test]
    fn rejects_invalid_calendar_date() {
        assert!(parse_wire_date("20261301").is_err());
    }

    #[test]
    fn cli_date_strips_dashes() {
        assert_eq!(cli_date_to_wire("2026-01-15").unwrap(), "20260115");
    }

    #[test]
    fn cli_date_rejects_malformed_input() {
        assert!(cli_date_to_wire("2026/01/15").is_err());
        assert!(cli_date_to_wire("not-a-date").is_err());
    }

    #[test]
    fn wire_any_dispatches_on_length() {
        assert!(parse_wire_any("20260115").is_ok());
        assert!(parse_wire_any("20260115T143000Z").is_ok());
        assert!(parse_wire_any("bogus").is_err());
    }
}
