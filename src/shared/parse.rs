//! Best-effort parsing of numbers and dates from market-data payloads.
//!
//! Nothing here fails: unparseable numbers become `NaN` and unparseable dates
//! become `None` (or [`INVALID_TIME`] once stored on a candle). Callers that
//! need strict data validate afterwards.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Candle time used when a source timestamp could not be parsed.
pub const INVALID_TIME: i64 = i64::MIN;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a float, yielding `NaN` for anything that is not a number.
pub fn parse_lenient_f64(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Parse a date or date-time string into epoch seconds.
///
/// Zone-less inputs are read as UTC. Date-only inputs resolve to midnight.
pub fn parse_datetime_secs(s: &str) -> Option<i64> {
    parse_datetime_millis(s).map(|ms| ms.div_euclid(1000))
}

/// Parse a date or date-time string into epoch milliseconds.
pub fn parse_datetime_millis(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }

    None
}

/// Convert epoch milliseconds (possibly fractional) to whole seconds, flooring.
pub fn millis_to_secs(ms: f64) -> i64 {
    if ms.is_finite() {
        (ms / 1000.0).floor() as i64
    } else {
        INVALID_TIME
    }
}
