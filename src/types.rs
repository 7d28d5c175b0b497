//! Shared primitive types.

use chrono::{DateTime, SecondsFormat, Utc};

/// Lowercase hex-encoded SHA-256 content digest of a file.
pub type Fixity = String;

/// All generation, diff, report and note timestamps are UTC.
pub type Timestamp = DateTime<Utc>;

/// Current time, used wherever a record is stamped.
pub fn now() -> Timestamp {
    Utc::now()
}

/// RFC 3339 rendering used in report file names and CLI output.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
