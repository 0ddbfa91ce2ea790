//! Snapshot document types and timestamp handling

use chrono::{NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::{Map, Value};
use std::fmt::Display;

/// One point-in-time mapping of currency codes to prices plus metadata.
pub type PriceSnapshot = Map<String, Value>;

/// Format of `created` and `last_modified`, e.g. `January 5, 2024 10:00`.
pub const TIMESTAMP_FORMAT: &str = "%B %d, %Y %H:%M";

pub const LAST_MODIFIED: &str = "last_modified";

/// Keys that describe when a snapshot was produced rather than a price.
pub const META_FIELDS: [&str; 9] = [
    "created",
    LAST_MODIFIED,
    "day",
    "month",
    "year",
    "hour",
    "minute",
    "second",
    "weekday",
];

pub fn is_meta_field(key: &str) -> bool {
    META_FIELDS.contains(&key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    /// Raw result of the latest fetch
    New,
    /// Merged live snapshot
    Current,
    /// Snapshot rolled over from `Current` about once a day
    Previous,
}

impl Display for SnapshotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SnapshotKind::New => "new",
                SnapshotKind::Current => "current",
                SnapshotKind::Previous => "previous",
            }
        )
    }
}

/// Parses a naive timestamp in [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if value.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}

/// Reads a naive UTC timestamp and renders it as wall-clock time in `tz`.
pub fn convert_timestamp(value: &str, tz: Tz) -> Option<String> {
    let naive = parse_timestamp(value)?;
    let local = Utc.from_utc_datetime(&naive).with_timezone(&tz);
    Some(local.format(TIMESTAMP_FORMAT).to_string())
}

pub fn last_modified(snapshot: &PriceSnapshot) -> Option<&str> {
    snapshot.get(LAST_MODIFIED).and_then(Value::as_str)
}
