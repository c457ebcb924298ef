//! View and visitor statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Counters for one category or topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStats {
    #[serde(default)]
    pub views: u64,
    /// Distinct visitor tokens; kept free of duplicates
    #[serde(default)]
    pub visitors: Vec<String>,
    #[serde(default)]
    pub last_visit: String,
    /// Present on topic entries only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl ViewStats {
    /// Add a visitor unless already present. Returns true when added.
    pub fn add_visitor(&mut self, visitor_id: &str) -> bool {
        if self.visitors.iter().any(|v| v == visitor_id) {
            return false;
        }
        self.visitors.push(visitor_id.to_string());
        true
    }

    pub fn counts(&self) -> ViewCounts {
        ViewCounts {
            view_count: self.views,
            visitor_count: self.visitors.len(),
        }
    }
}

/// The whole `2hacker_stats` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub categories: BTreeMap<String, ViewStats>,
    #[serde(default)]
    pub topics: BTreeMap<String, ViewStats>,
}

/// The unit over which views are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewScope<'a> {
    Category,
    /// Topic entries remember their owning category
    Topic { category_id: &'a str },
}

/// Counts returned for immediate display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCounts {
    pub view_count: u64,
    pub visitor_count: usize,
}
