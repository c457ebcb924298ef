//! Forum categories.

use serde::Serialize;

/// A top-level section of the forum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

static CATEGORIES: [Category; 3] = [
    Category {
        id: "general",
        name: "General discussion",
        description: "Talk about anything and share the news",
    },
    Category {
        id: "technology",
        name: "Technology",
        description: "Gadgets, software and IT news",
    },
    Category {
        id: "entertainment",
        name: "Entertainment",
        description: "Films, games, music and other fun",
    },
];

/// The fixed category catalog shown on the index page.
pub fn default_categories() -> &'static [Category] {
    &CATEGORIES
}

pub fn find_category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// Title for a category page; unknown IDs get a generic label.
pub fn category_title(id: &str) -> &'static str {
    find_category(id).map(|c| c.name).unwrap_or("Category")
}

/// Index page figures for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category_id: String,
    pub topic_count: usize,
    pub message_count: usize,
    pub view_count: u64,
    pub visitor_count: usize,
}
