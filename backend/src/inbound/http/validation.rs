//! Explicit input-validation helpers run before the domain is invoked.
//!
//! Date-time fields arrive as strings and are parsed here so malformed input
//! produces the standard error envelope instead of a framework-level
//! deserialisation failure.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::str::FromStr;

use crate::domain::Error;

/// Parse an RFC 3339 instant, naming the offending field on failure.
pub fn parse_instant(field: &str, value: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            Error::invalid_request(format!("{field} must be a valid RFC 3339 date-time"))
                .with_details(json!({ "field": field }))
        })
}

/// Parse an enumerated status field, listing the offending field on failure.
pub fn parse_status<T>(field: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
{
    value.parse::<T>().map_err(|_| {
        Error::invalid_request(format!("invalid {field} provided"))
            .with_details(json!({ "field": field, "value": value }))
    })
}

/// Reject missing required string fields with a uniform message.
pub fn require_field<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, Error> {
    match value.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed),
        _ => Err(Error::invalid_request(format!("{field} is required"))
            .with_details(json!({ "field": field }))),
    }
}
