//! Timestamp encoding for TEXT columns.

use chrono::{DateTime, SecondsFormat, Utc};

/// Encode as fixed-width RFC 3339 so that string order matches time order.
/// Nanosecond precision keeps stored values equal to the ones handed back.
pub fn encode(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
