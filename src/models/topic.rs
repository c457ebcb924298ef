//! Topic model.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Topics grouped by the category that owns them.
pub type TopicsByCategory = BTreeMap<String, Vec<Topic>>;

/// A discussion thread within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// `"<categoryId>_<millis>"` for new topics; older data may use bare numbers
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Display nickname, not an identity
    pub author: String,
    pub created_at: String,
    pub last_active: String,
    #[serde(default)]
    pub message_count: usize,
    /// Visitor token of the creator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<String>,
}

/// Sort topics for display: most recently active first.
///
/// Timestamps that parse as RFC 3339 are compared as instants and come
/// before any that do not; unparseable ones are ordered by their raw text.
/// The sort is stable.
pub fn sort_by_last_active(topics: &mut [Topic]) {
    topics.sort_by(|a, b| compare_timestamps(&b.last_active, &a.last_active));
}

fn compare_timestamps(a: &str, b: &str) -> Ordering {
    let instant = |s: &str| DateTime::parse_from_rfc3339(s).ok();
    instant(a)
        .cmp(&instant(b))
        .then_with(|| a.cmp(b))
}
