//! Timestamp parsing for user-entered dates.
//!
//! Accepted forms:
//! - RFC 3339 (`2024-02-01T09:30:00-06:00`): offset honored as given
//! - `YYYY-MM-DD HH:MM` / `YYYY-MM-DDTHH:MM`: local time in the owner's IANA zone
//! - `YYYY-MM-DD`: that calendar date at 00:00 UTC

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use spendlens_core::ValidationError;

const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

pub fn parse_timezone(tz: &str) -> Result<Tz, ValidationError> {
    tz.parse()
        .map_err(|_| ValidationError::InvalidTimezone(tz.to_string()))
}

/// Parse a transaction date in timezone `tz`, returning UTC.
pub fn parse_occurred_at(text: &str, tz: &str) -> Result<DateTime<Utc>, ValidationError> {
    let text = text.trim();
    let invalid = |reason: &str| ValidationError::InvalidDate {
        value: text.to_string(),
        reason: reason.to_string(),
    };

    if text.is_empty() {
        return Err(ValidationError::MissingField("date"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|ndt| Utc.from_utc_datetime(&ndt))
            .ok_or_else(|| invalid("out of range"));
    }

    let ndt = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .ok_or_else(|| invalid("expected YYYY-MM-DD, YYYY-MM-DD HH:MM or RFC 3339"))?;

    let tz = parse_timezone(tz)?;
    let local = tz
        .from_local_datetime(&ndt)
        .single()
        .ok_or_else(|| invalid("ambiguous or nonexistent local time (DST?)"))?;

    Ok(local.with_timezone(&Utc))
}
