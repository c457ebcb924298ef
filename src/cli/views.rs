//! Plain-text renderings of the forum pages.

use chrono::DateTime;

use crate::models::{category_title, Category, CategorySummary, Message, Topic, ViewCounts};

/// Index page: one block per category.
pub fn render_categories(rows: &[(&Category, CategorySummary)]) -> String {
    let mut out = String::new();
    for (category, summary) in rows {
        out.push_str(&format!("{} [{}]\n", category.name, category.id));
        out.push_str(&format!("  {}\n", category.description));
        out.push_str(&format!(
            "  {} topics, {} messages, {} views, {} visitors\n",
            summary.topic_count, summary.message_count, summary.view_count, summary.visitor_count
        ));
    }
    out
}

/// Category page. `topics` are expected in display order.
pub fn render_topic_list(category_id: &str, topics: &[Topic], counts: ViewCounts) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} ({} views, {} visitors)\n",
        category_title(category_id),
        counts.view_count,
        counts.visitor_count
    ));

    if topics.is_empty() {
        out.push_str("No topics yet. Create the first one.\n");
        return out;
    }

    for topic in topics {
        out.push_str(&format!("- {} [{}]\n", topic.title, topic.id));
        if let Some(description) = &topic.description {
            out.push_str(&format!("  {}\n", description));
        }
        out.push_str(&format!(
            "  by {}, {} replies, last active {}\n",
            topic.author,
            topic.message_count,
            display_time(&topic.last_active)
        ));
    }
    out
}

/// Topic page: header, then every message with its attachments.
pub fn render_thread(
    category_id: &str,
    topic: &Topic,
    messages: &[Message],
    counts: ViewCounts,
    owned: bool,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} / {}\n", category_title(category_id), topic.title));
    if let Some(description) = &topic.description {
        out.push_str(&format!("{}\n", description));
    }
    out.push_str(&format!(
        "Started by {} on {} | {} views, {} visitors{}\n",
        topic.author,
        display_time(&topic.created_at),
        counts.view_count,
        counts.visitor_count,
        if owned { " | you can delete this topic" } else { "" }
    ));

    if messages.is_empty() {
        out.push_str("\nNo messages yet.\n");
    }

    for message in messages {
        out.push_str(&format!(
            "\n{} ({})\n",
            message.author,
            display_time(&message.timestamp)
        ));
        for line in message.content.lines() {
            out.push_str(&format!("  {}\n", line));
        }
        for file in &message.files {
            out.push_str(&format!(
                "  [{}] {} <{}>\n",
                file.kind.as_str(),
                file.name,
                file.url
            ));
        }
    }
    out
}

/// `YYYY-MM-DD HH:MM` for RFC 3339 input, the raw string otherwise.
pub fn display_time(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}
