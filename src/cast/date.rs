//! Date Casting
//!
//! Turns raw attribute values into date/times. Accepted inputs, first match
//! wins: a date/time value, a numeric Unix epoch, a `YYYY-M-D` calendar date
//! (start of day), then the fixed `YYYY-MM-DD HH:MM:SS` layout.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SubsecRound, TimeZone};

use crate::error::{OrmError, Result};
use crate::model::{AttributeValue, DATETIME_FORMAT};

// == As Date Time ==
/// Interprets `value` as a date/time. Epochs are placed in `offset`, and
/// zone-less text is read as local time in `offset`. Date/time values keep
/// their own zone and are cut to microseconds.
pub fn as_date_time(value: &AttributeValue, offset: &FixedOffset) -> Result<DateTime<FixedOffset>> {
    match value {
        AttributeValue::DateTime(dt) => Ok(dt.trunc_subsecs(6)),
        AttributeValue::Int(secs) => from_epoch(*secs, 0, offset),
        AttributeValue::Float(secs) => from_epoch_float(*secs, offset),
        AttributeValue::String(text) => parse_date_text(text, offset),
        AttributeValue::Null => Err(OrmError::MalformedDate("null".to_string())),
    }
}

fn parse_date_text(text: &str, offset: &FixedOffset) -> Result<DateTime<FixedOffset>> {
    if let Some(secs) = numeric(text) {
        return match text.trim().parse::<i64>() {
            Ok(whole) => from_epoch(whole, 0, offset),
            Err(_) => from_epoch_float(secs, offset),
        };
    }

    if let Some(date) = plain_date(text)? {
        return local(date.and_time(chrono::NaiveTime::MIN), text, offset);
    }

    let naive = NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .map_err(|_| OrmError::MalformedDate(text.to_string()))?;
    local(naive, text, offset)
}

fn local(naive: NaiveDateTime, text: &str, offset: &FixedOffset) -> Result<DateTime<FixedOffset>> {
    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| OrmError::MalformedDate(text.to_string()))
}

/// Matches `^\d{4}-\d{1,2}-\d{1,2}$`. A match naming an impossible day is an error.
fn plain_date(text: &str) -> Result<Option<NaiveDate>> {
    let parts: Vec<&str> = text.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return Ok(None);
    };
    let digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !(digits(year, 4, 4) && digits(month, 1, 2) && digits(day, 1, 2)) {
        return Ok(None);
    }

    let parsed = match (year.parse(), month.parse(), day.parse()) {
        (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
        _ => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| OrmError::MalformedDate(text.to_string()))
}

fn from_epoch(secs: i64, nanos: u32, offset: &FixedOffset) -> Result<DateTime<FixedOffset>> {
    DateTime::from_timestamp(secs, nanos)
        .map(|utc| utc.with_timezone(offset))
        .ok_or_else(|| OrmError::MalformedDate(secs.to_string()))
}

/// Splits a fractional epoch, keeping microsecond precision.
fn from_epoch_float(secs: f64, offset: &FixedOffset) -> Result<DateTime<FixedOffset>> {
    if !secs.is_finite() {
        return Err(OrmError::MalformedDate(secs.to_string()));
    }
    let whole = secs.floor();
    let micros = ((secs - whole) * 1_000_000.0).round() as u32;
    let (whole, micros) = if micros >= 1_000_000 {
        (whole + 1.0, 0)
    } else {
        (whole, micros)
    };
    from_epoch(whole as i64, micros * 1_000, offset)
}

/// Parses text that is entirely a decimal number, optionally signed and
/// with an exponent. Words such as `inf` or `NaN` do not count.
pub(crate) fn numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty()
        || !trimmed
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        || !trimmed.bytes().any(|b| b.is_ascii_digit())
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, Timelike, Utc};

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    fn fmt(dt: DateTime<FixedOffset>) -> String {
        dt.format(DATETIME_FORMAT).to_string()
    }

    #[test]
    fn test_epoch_integer() {
        let dt = as_date_time(&AttributeValue::Int(1561437696), &utc()).unwrap();
        assert_eq!(fmt(dt), "2019-06-25 04:41:36");
    }

    #[test]
    fn test_epoch_in_offset() {
        let bst = FixedOffset::east_opt(3600).unwrap();
        let dt = as_date_time(&AttributeValue::Int(1561437696), &bst).unwrap();

        assert_eq!(fmt(dt), "2019-06-25 05:41:36");
        assert_eq!(dt.timestamp(), 1561437696);
    }

    #[test]
    fn test_epoch_numeric_string() {
        let dt = as_date_time(&AttributeValue::from("1561437696"), &utc()).unwrap();
        assert_eq!(dt.timestamp(), 1561437696);
    }

    #[test]
    fn test_epoch_fraction() {
        let dt = as_date_time(&AttributeValue::from("1561437696.25"), &utc()).unwrap();
        assert_eq!(dt.timestamp(), 1561437696);
        assert_eq!(dt.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_plain_date_start_of_day() {
        let dt = as_date_time(&AttributeValue::from("2019-6-5"), &utc()).unwrap();
        assert_eq!(fmt(dt), "2019-06-05 00:00:00");
    }

    #[test]
    fn test_plain_date_out_of_range() {
        let result = as_date_time(&AttributeValue::from("2019-13-01"), &utc());
        assert!(matches!(result, Err(OrmError::MalformedDate(_))));
    }

    #[test]
    fn test_full_datetime() {
        let dt = as_date_time(&AttributeValue::from("2020-01-02 03:04:05"), &utc()).unwrap();
        assert_eq!(fmt(dt), "2020-01-02 03:04:05");
    }

    #[test]
    fn test_malformed_date() {
        let result = as_date_time(&AttributeValue::from("next tuesday"), &utc());
        assert!(matches!(result, Err(OrmError::MalformedDate(_))));

        let result = as_date_time(&AttributeValue::from("2020-01-02T03:04:05"), &utc());
        assert!(matches!(result, Err(OrmError::MalformedDate(_))));
    }

    #[test]
    fn test_datetime_passthrough() {
        let original = FixedOffset::east_opt(-5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2021, 3, 4, 5, 6, 7)
            .unwrap();
        let dt = as_date_time(&AttributeValue::DateTime(original), &utc()).unwrap();

        assert_eq!(dt, original);
        assert_eq!(dt.offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_datetime_truncated_to_micros() {
        let original = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2021, 3, 4, 5, 6, 7)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let dt = as_date_time(&AttributeValue::DateTime(original), &utc()).unwrap();

        assert_eq!(dt.nanosecond(), 123_456_000);
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(dt.timestamp(), original.timestamp());
    }

    #[test]
    fn test_numeric_detection() {
        assert_eq!(numeric(" 12 "), Some(12.0));
        assert_eq!(numeric("-1.5e2"), Some(-150.0));
        assert_eq!(numeric("inf"), None);
        assert_eq!(numeric("2019-06-25"), None);
        assert_eq!(numeric(""), None);
        assert_eq!(numeric("-"), None);
    }
}
