//! Shared helpers.

use chrono::{DateTime, SecondsFormat, Utc};

const SECONDS_PER_DAY: i64 = 86400;

/// Format a timestamp as ISO-8601 with millisecond precision and a `Z` suffix,
/// e.g. `2024-05-01T12:00:00.000Z`.
pub fn to_iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `base` shifted forward by whole days.
pub fn days_after(base: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    base + chrono::Duration::seconds(days * SECONDS_PER_DAY)
}
