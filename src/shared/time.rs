//! Timestamp parsing and "time ago" rendering
//!
//! The backend is inconsistent about timestamp formats: some endpoints send
//! `DD/MM/YY HH:mm:ss`, others ISO-8601. The strict day/month/year pattern is
//! always tried first, because a generic parser would read `05/06/23` as
//! month/day. A strict match is read as a calendar day: only `DD/MM/YY`
//! counts and the clock part is dropped, so it renders relative to midnight.
//! Values without a zone are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::shared::error::SharedError;

/// Rendered when a timestamp cannot be parsed at all
pub const INVALID_DATE: &str = "Invalid date";

const STRICT_DMY_DATE_FORMAT: &str = "%d/%m/%y";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Whether `raw` is exactly `DD/MM/YY HH:mm:ss` (two digits per field)
pub fn matches_strict_dmy(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.len() != 17 {
        return false;
    }
    bytes.iter().enumerate().all(|(i, b)| match i {
        2 | 5 => *b == b'/',
        8 => *b == b' ',
        11 | 14 => *b == b':',
        _ => b.is_ascii_digit(),
    })
}

/// Parse a server timestamp, strict day/month/year first
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, SharedError> {
    let raw = raw.trim();

    if matches_strict_dmy(raw) {
        // The pattern matched, so a failure here means an impossible date
        // (e.g. 31/02); do not let the generic parsers reinterpret it.
        return NaiveDate::parse_from_str(&raw[..8], STRICT_DMY_DATE_FORMAT)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| SharedError::timestamp(raw));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(SharedError::timestamp(raw))
}

/// Render `then` relative to `now` ("3 hours ago", "in a minute", ...)
///
/// Buckets follow the conventional humanized thresholds: up to 44 seconds is
/// "a few seconds", up to 44 minutes counts minutes, up to 21 hours counts
/// hours, up to 25 days counts days, up to 10 months counts months.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta_ms = (now - then).num_milliseconds();
    let future = delta_ms < 0;
    let abs_secs = delta_ms.unsigned_abs() as f64 / 1000.0;

    let seconds = abs_secs.round();
    let minutes = (abs_secs / 60.0).round();
    let hours = (abs_secs / 3_600.0).round();
    let days_exact = abs_secs / 86_400.0;
    let days = days_exact.round();
    let months = (days_exact / 30.436_875).round();
    let years = (days_exact / 365.242_5).round();

    let phrase = if seconds <= 44.0 {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes", minutes as u64)
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{} hours", hours as u64)
    } else if days <= 1.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{} days", days as u64)
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < 11.0 {
        format!("{} months", months as u64)
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{} years", years as u64)
    };

    if future {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

/// Parse and render in one step; unparsable input renders [`INVALID_DATE`]
pub fn time_ago(raw: &str, now: DateTime<Utc>) -> String {
    match parse_timestamp(raw) {
        Ok(then) => relative_time(then, now),
        Err(e) => {
            tracing::debug!("{}", e);
            INVALID_DATE.to_string()
        }
    }
}
