//! Data models for the forum.
//!
//! These models serialize to exactly the JSON shapes the browser front end
//! keeps in local storage, so existing data reads back unchanged.

mod category;
mod message;
mod stats;
mod topic;

pub use category::*;
pub use message::*;
pub use stats::*;
pub use topic::*;

use chrono::{SecondsFormat, Utc};

/// Current time as an ISO 8601 string with millisecond precision and `Z` suffix.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
