//! Store operations over a [`StoragePort`].
//!
//! Each mutation reads the namespaces it touches, changes them in memory and
//! overwrites them whole. Derived counters are maintained here and nowhere
//! else.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{
    now_iso, now_millis, Attachment, CategorySummary, Message, MessagesByTopic, Stats, Topic,
    TopicsByCategory, ViewCounts, ViewScope, ViewStats,
};
use crate::ownership;
use crate::storage::{
    StoragePort, MESSAGES_KEY, NICKNAME_KEY, STATS_KEY, TOPICS_KEY, VISITOR_ID_KEY,
};

/// Forum state persisted in a key-value backend.
#[derive(Debug, Clone)]
pub struct LocalStore<S> {
    storage: S,
}

impl<S: StoragePort> LocalStore<S> {
    /// Create a store over `storage`.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    // ==================== NAMESPACE OPERATIONS ====================

    /// All topics, keyed by category.
    pub fn get_topics(&self) -> TopicsByCategory {
        self.read_json(TOPICS_KEY)
    }

    /// Overwrite the whole topic namespace. Last writer wins.
    pub fn save_topics(&self, topics: &TopicsByCategory) {
        self.write_json(TOPICS_KEY, topics);
    }

    /// All message lists, keyed by topic.
    pub fn get_messages(&self) -> MessagesByTopic {
        self.read_json(MESSAGES_KEY)
    }

    /// Overwrite the whole message namespace. Last writer wins.
    pub fn save_messages(&self, messages: &MessagesByTopic) {
        self.write_json(MESSAGES_KEY, messages);
    }

    /// View and visitor statistics for categories and topics.
    pub fn get_stats(&self) -> Stats {
        self.read_json(STATS_KEY)
    }

    /// Overwrite the statistics namespace. Last writer wins.
    pub fn save_stats(&self, stats: &Stats) {
        self.write_json(STATS_KEY, stats);
    }

    // ==================== TOPIC OPERATIONS ====================

    /// Topics of one category in stored order.
    pub fn list_topics(&self, category_id: &str) -> Vec<Topic> {
        self.get_topics().remove(category_id).unwrap_or_default()
    }

    /// Look a topic up in every category. Returns the owning category too.
    pub fn find_topic(&self, topic_id: &str) -> Option<(String, Topic)> {
        self.get_topics().into_iter().find_map(|(category_id, topics)| {
            topics
                .into_iter()
                .find(|t| t.id == topic_id)
                .map(|t| (category_id.clone(), t))
        })
    }

    /// Create a topic at the front of its category's list.
    pub fn create_topic(
        &self,
        category_id: &str,
        title: &str,
        description: Option<&str>,
        author: &str,
    ) -> Result<Topic, AppError> {
        if category_id.trim().is_empty() {
            return Err(AppError::Validation("Category is required".to_string()));
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let visitor_id = self.visitor_id();
        let mut topics = self.get_topics();
        let list = topics.entry(category_id.to_string()).or_default();

        let mut millis = now_millis();
        let id = loop {
            let candidate = format!("{}_{}", category_id, millis);
            if !list.iter().any(|t| t.id == candidate) {
                break candidate;
            }
            millis += 1;
        };

        let now = now_iso();
        let topic = Topic {
            id,
            title: title.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            author: author.to_string(),
            created_at: now.clone(),
            last_active: now,
            message_count: 0,
            visitor_id: Some(visitor_id),
        };

        list.insert(0, topic.clone());
        self.save_topics(&topics);

        tracing::info!("Created topic {} in {}", topic.id, category_id);
        Ok(topic)
    }

    /// Remove a topic, its message list and its statistics.
    ///
    /// Every write is attempted even if an earlier one was dropped.
    pub fn delete_topic(&self, category_id: &str, topic_id: &str) {
        let mut topics = self.get_topics();
        if let Some(list) = topics.get_mut(category_id) {
            list.retain(|t| t.id != topic_id);
        }
        self.save_topics(&topics);

        let mut messages = self.get_messages();
        messages.remove(topic_id);
        self.save_messages(&messages);

        let mut stats = self.get_stats();
        if stats.topics.remove(topic_id).is_some() {
            self.save_stats(&stats);
        }

        tracing::info!("Deleted topic {} from {}", topic_id, category_id);
    }

    /// Whether this browser created `topic`. Advisory only; see [`ownership`].
    pub fn owns_topic(&self, topic: &Topic) -> bool {
        ownership::is_owner(topic, &self.visitor_id())
    }

    /// Delete a topic if this browser's visitor token created it.
    pub fn delete_owned_topic(&self, category_id: &str, topic_id: &str) -> Result<(), AppError> {
        let topic = self
            .list_topics(category_id)
            .into_iter()
            .find(|t| t.id == topic_id)
            .ok_or_else(|| AppError::NotFound(format!("Topic {} not found", topic_id)))?;

        if !self.owns_topic(&topic) {
            return Err(AppError::Forbidden(format!(
                "Topic {} was created by another visitor",
                topic_id
            )));
        }

        self.delete_topic(category_id, topic_id);
        Ok(())
    }

    // ==================== MESSAGE OPERATIONS ====================

    /// Messages of one topic in posting order.
    pub fn messages_for(&self, topic_id: &str) -> Vec<Message> {
        self.get_messages().remove(topic_id).unwrap_or_default()
    }

    /// Append a message and bring the topic's `messageCount` and `lastActive`
    /// in line with it. Returns the updated topic.
    pub fn append_message(&self, topic_id: &str, message: Message) -> Result<Topic, AppError> {
        if message.content.trim().is_empty() {
            return Err(AppError::Validation("Message text is required".to_string()));
        }

        let mut topics = self.get_topics();
        let topic = topics
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|t| t.id == topic_id)
            .ok_or_else(|| AppError::NotFound(format!("Topic {} not found", topic_id)))?;

        let mut messages = self.get_messages();
        let list = messages.entry(topic_id.to_string()).or_default();
        topic.last_active = message.timestamp.clone();
        list.push(message);
        topic.message_count = list.len();
        let updated = topic.clone();

        self.save_messages(&messages);
        self.save_topics(&topics);

        tracing::debug!(
            "Appended message to {} ({} messages)",
            topic_id,
            updated.message_count
        );
        Ok(updated)
    }

    /// Build a message stamped now and append it.
    pub fn send_message(
        &self,
        topic_id: &str,
        author: &str,
        content: &str,
        files: Vec<Attachment>,
    ) -> Result<Message, AppError> {
        let message = Message::new(author, content.trim(), files);
        self.append_message(topic_id, message.clone())?;
        Ok(message)
    }

    // ==================== STATISTICS ====================

    /// Count a view by the current visitor and return the updated counts.
    pub fn record_view(&self, scope: ViewScope<'_>, id: &str) -> ViewCounts {
        let visitor_id = self.visitor_id();
        let mut stats = self.get_stats();

        let entry = match scope {
            ViewScope::Category => stats.categories.entry(id.to_string()).or_default(),
            ViewScope::Topic { category_id } => {
                let entry = stats.topics.entry(id.to_string()).or_default();
                entry.category_id = Some(category_id.to_string());
                entry
            }
        };
        entry.views += 1;
        entry.add_visitor(&visitor_id);
        entry.last_visit = now_iso();
        let counts = entry.counts();

        self.save_stats(&stats);
        counts
    }

    /// Current counts without recording a view.
    pub fn view_counts(&self, scope: ViewScope<'_>, id: &str) -> ViewCounts {
        let stats = self.get_stats();
        let entry = match scope {
            ViewScope::Category => stats.categories.get(id),
            ViewScope::Topic { .. } => stats.topics.get(id),
        };
        entry.map(ViewStats::counts).unwrap_or_default()
    }

    /// Index page figures for a category.
    pub fn category_summary(&self, category_id: &str) -> CategorySummary {
        let topics = self.list_topics(category_id);
        let counts = self.view_counts(ViewScope::Category, category_id);

        CategorySummary {
            category_id: category_id.to_string(),
            topic_count: topics.len(),
            message_count: topics.iter().map(|t| t.message_count).sum(),
            view_count: counts.view_count,
            visitor_count: counts.visitor_count,
        }
    }

    // ==================== VISITOR IDENTITY ====================

    /// This browser's visitor token, created on first use and never rotated.
    ///
    /// When the stored token cannot be read, a temporary token is returned
    /// and the stored one is left in place.
    pub fn visitor_id(&self) -> String {
        match self.storage.read(VISITOR_ID_KEY) {
            Ok(Some(id)) if !id.is_empty() => id,
            Ok(_) => {
                let id = new_visitor_token();
                self.write_raw(VISITOR_ID_KEY, &id);
                tracing::debug!("Generated visitor id");
                id
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to read {}, using a temporary visitor id: {}",
                    VISITOR_ID_KEY,
                    e
                );
                new_visitor_token()
            }
        }
    }

    /// Stored nickname, trimmed; `None` when unset or blank.
    pub fn nickname(&self) -> Option<String> {
        self.read_raw(NICKNAME_KEY)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
    }

    /// Store a trimmed nickname; blank names are rejected.
    pub fn set_nickname(&self, nickname: &str) -> Result<(), AppError> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(AppError::Validation("Nickname cannot be empty".to_string()));
        }
        self.write_raw(NICKNAME_KEY, nickname);
        Ok(())
    }

    /// Stored nickname, or a stable `Guest<NNNN>` derived from the visitor token.
    pub fn display_nickname(&self) -> String {
        self.nickname()
            .unwrap_or_else(|| guest_nickname(&self.visitor_id()))
    }

    // ==================== RAW ACCESS ====================

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.storage.read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to read {}, treating as absent: {}", key, e);
                None
            }
        }
    }

    fn write_raw(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.write(key, value) {
            tracing::error!("Dropping write to {}: {}", key, e);
        }
    }

    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.read_raw(key) else {
            return T::default();
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            let err = AppError::StorageRead(format!("Malformed JSON: {}", e));
            tracing::warn!("Failed to parse {}, using empty value: {}", key, err);
            T::default()
        })
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.write_raw(key, &raw),
            Err(e) => tracing::error!("Dropping write to {}: failed to serialize: {}", key, e),
        }
    }
}

fn new_visitor_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn guest_nickname(visitor_id: &str) -> String {
    let hash = visitor_id
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    format!("Guest{:04}", hash % 10_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttachmentKind;
    use crate::storage::MemoryStorage;

    fn store() -> LocalStore<MemoryStorage> {
        LocalStore::new(MemoryStorage::new())
    }

    fn message_at(content: &str, timestamp: &str) -> Message {
        Message {
            id: "m1".to_string(),
            author: "Guest0001".to_string(),
            content: content.to_string(),
            timestamp: timestamp.to_string(),
            files: Vec::new(),
        }
    }

    #[test]
    fn test_empty_storage_reads_empty() {
        let store = store();
        assert!(store.get_topics().is_empty());
        assert!(store.get_messages().is_empty());
        assert_eq!(store.get_stats(), Stats::default());
    }

    #[test]
    fn test_malformed_json_reads_empty() {
        let store = store();
        store.storage().insert_raw(TOPICS_KEY, "{not json");
        store.storage().insert_raw(MESSAGES_KEY, "[1, 2, 3]");
        store.storage().insert_raw(STATS_KEY, "null");

        assert!(store.get_topics().is_empty());
        assert!(store.get_messages().is_empty());
        assert_eq!(store.get_stats(), Stats::default());
    }

    #[test]
    fn test_create_topic_prepends_and_records_visitor() {
        let store = store();
        let first = store.create_topic("general", "First", None, "A").unwrap();
        let second = store.create_topic("general", "Second", None, "B").unwrap();

        let topics = store.list_topics("general");
        assert_eq!(topics[0].id, second.id);
        assert_eq!(topics[1].id, first.id);
        assert_eq!(first.visitor_id, Some(store.visitor_id()));
        assert!(first.id.starts_with("general_"));
    }

    #[test]
    fn test_create_topic_ids_unique_within_category() {
        let store = store();
        for i in 0..50 {
            store
                .create_topic("technology", &format!("Topic {}", i), None, "A")
                .unwrap();
        }

        let topics = store.list_topics("technology");
        let mut ids: Vec<_> = topics.iter().map(|t| t.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_create_topic_trims_and_validates() {
        let store = store();
        let topic = store
            .create_topic("general", "  Spaced  ", Some("   "), "A")
            .unwrap();
        assert_eq!(topic.title, "Spaced");
        assert!(topic.description.is_none());

        let err = store.create_topic("general", "   ", None, "A").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.list_topics("general").len(), 1);
    }

    #[test]
    fn test_append_message_updates_counters() {
        let store = store();
        let topic = store.create_topic("general", "Hello", None, "A").unwrap();

        let updated = store
            .append_message(&topic.id, message_at("hi", "2030-01-01T00:00:00.000Z"))
            .unwrap();

        assert_eq!(updated.message_count, 1);
        assert_eq!(updated.last_active, "2030-01-01T00:00:00.000Z");
        let (_, stored) = store.find_topic(&topic.id).unwrap();
        assert_eq!(stored, updated);
        assert_eq!(store.messages_for(&topic.id).len(), 1);
    }

    #[test]
    fn test_append_message_repairs_drifted_count() {
        let store = store();
        let topic = store.create_topic("general", "Hello", None, "A").unwrap();

        let mut topics = store.get_topics();
        topics.get_mut("general").unwrap()[0].message_count = 7;
        store.save_topics(&topics);

        let updated = store
            .append_message(&topic.id, message_at("hi", "2030-01-01T00:00:00.000Z"))
            .unwrap();
        assert_eq!(updated.message_count, 1);
    }

    #[test]
    fn test_append_message_unknown_topic_writes_nothing() {
        let store = store();
        let writes = store.storage().write_count();

        let err = store
            .append_message("missing", message_at("hi", "t"))
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.storage().write_count(), writes);
        assert!(store.get_messages().is_empty());
    }

    #[test]
    fn test_append_blank_message_rejected() {
        let store = store();
        let topic = store.create_topic("general", "Hello", None, "A").unwrap();

        let err = store
            .append_message(&topic.id, message_at(" \n ", "t"))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.find_topic(&topic.id).unwrap().1.message_count, 0);
    }

    #[test]
    fn test_send_message_keeps_attachments() {
        let store = store();
        let topic = store.create_topic("general", "Pics", None, "A").unwrap();
        let files = vec![Attachment {
            name: "cat.png".to_string(),
            url: "file:///tmp/cat.png".to_string(),
            kind: AttachmentKind::Image,
        }];

        let message = store.send_message(&topic.id, "B", "  look  ", files).unwrap();

        assert_eq!(message.content, "look");
        let stored = store.messages_for(&topic.id);
        assert_eq!(stored, vec![message]);
    }

    #[test]
    fn test_delete_topic_cascades() {
        let store = store();
        let keep = store.create_topic("general", "Keep", None, "A").unwrap();
        let gone = store.create_topic("general", "Gone", None, "A").unwrap();
        store.send_message(&keep.id, "A", "stay", Vec::new()).unwrap();
        store.send_message(&gone.id, "A", "bye", Vec::new()).unwrap();
        store.record_view(ViewScope::Topic { category_id: "general" }, &gone.id);

        store.delete_topic("general", &gone.id);

        let ids: Vec<_> = store.list_topics("general").into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![keep.id.clone()]);
        assert!(!store.get_messages().contains_key(&gone.id));
        assert!(store.get_messages().contains_key(&keep.id));
        assert!(!store.get_stats().topics.contains_key(&gone.id));
    }

    #[test]
    fn test_delete_owned_topic_checks_token() {
        let store = store();
        let mine = store.create_topic("general", "Mine", None, "A").unwrap();

        let mut topics = store.get_topics();
        topics.get_mut("general").unwrap().push(Topic {
            visitor_id: Some("someone-else".to_string()),
            id: "42".to_string(),
            ..mine.clone()
        });
        store.save_topics(&topics);

        let err = store.delete_owned_topic("general", "42").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = store.delete_owned_topic("technology", &mine.id).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        store.delete_owned_topic("general", &mine.id).unwrap();
        assert_eq!(store.list_topics("general").len(), 1);
    }

    #[test]
    fn test_record_view_counts_visitor_once() {
        let store = store();

        let first = store.record_view(ViewScope::Category, "general");
        let second = store.record_view(ViewScope::Category, "general");

        assert_eq!(first, ViewCounts { view_count: 1, visitor_count: 1 });
        assert_eq!(second, ViewCounts { view_count: 2, visitor_count: 1 });
        assert_eq!(store.view_counts(ViewScope::Category, "general"), second);
    }

    #[test]
    fn test_record_view_topic_remembers_category() {
        let store = store();
        store.record_view(ViewScope::Topic { category_id: "technology" }, "tech_1");

        let stats = store.get_stats();
        let entry = &stats.topics["tech_1"];
        assert_eq!(entry.category_id.as_deref(), Some("technology"));
        assert!(!entry.last_visit.is_empty());
        assert!(stats.categories.is_empty());
    }

    #[test]
    fn test_record_view_adds_new_visitor() {
        let store = store();
        store.storage().insert_raw(
            STATS_KEY,
            r#"{"categories":{"general":{"views":5,"visitors":["other"],"lastVisit":""}},"topics":{}}"#,
        );

        let counts = store.record_view(ViewScope::Category, "general");
        assert_eq!(counts, ViewCounts { view_count: 6, visitor_count: 2 });
    }

    #[test]
    fn test_category_summary() {
        let store = store();
        let a = store.create_topic("general", "A", None, "A").unwrap();
        store.create_topic("general", "B", None, "A").unwrap();
        store.send_message(&a.id, "A", "one", Vec::new()).unwrap();
        store.send_message(&a.id, "A", "two", Vec::new()).unwrap();
        store.record_view(ViewScope::Category, "general");

        let summary = store.category_summary("general");
        assert_eq!(summary.topic_count, 2);
        assert_eq!(summary.message_count, 2);
        assert_eq!(summary.view_count, 1);
        assert_eq!(summary.visitor_count, 1);
    }

    #[test]
    fn test_visitor_id_is_stable() {
        let store = store();
        let id = store.visitor_id();
        assert_eq!(id.len(), 32);
        assert_eq!(store.visitor_id(), id);
        assert_eq!(store.storage().raw(VISITOR_ID_KEY), Some(id));
    }

    #[test]
    fn test_read_failure_reads_empty() {
        let store = store();
        let topic = store.create_topic("general", "Hello", None, "A").unwrap();
        store.send_message(&topic.id, "A", "hi", Vec::new()).unwrap();
        store.record_view(ViewScope::Category, "general");

        store.storage().set_fail_reads(true);
        assert!(store.get_topics().is_empty());
        assert!(store.get_messages().is_empty());
        assert_eq!(store.get_stats(), Stats::default());
        assert!(store.nickname().is_none());

        store.storage().set_fail_reads(false);
        assert_eq!(store.list_topics("general").len(), 1);
    }

    #[test]
    fn test_visitor_id_not_rotated_on_read_failure() {
        let store = store();
        let original = store.visitor_id();
        let writes = store.storage().write_count();

        store.storage().set_fail_reads(true);
        let temporary = store.visitor_id();
        assert_ne!(temporary, original);
        assert_eq!(store.storage().write_count(), writes);

        store.storage().set_fail_reads(false);
        assert_eq!(store.storage().raw(VISITOR_ID_KEY), Some(original.clone()));
        assert_eq!(store.visitor_id(), original);
    }

    #[test]
    fn test_empty_visitor_id_is_replaced() {
        let store = store();
        store.storage().insert_raw(VISITOR_ID_KEY, "");
        let id = store.visitor_id();
        assert_eq!(id.len(), 32);
        assert_eq!(store.storage().raw(VISITOR_ID_KEY), Some(id));
    }

    #[test]
    fn test_existing_visitor_id_is_reused() {
        let store = store();
        store.storage().insert_raw(VISITOR_ID_KEY, "legacy-token");
        assert_eq!(store.visitor_id(), "legacy-token");
    }

    #[test]
    fn test_nickname_round_trip() {
        let store = store();
        assert!(store.nickname().is_none());

        let guest = store.display_nickname();
        assert!(guest.starts_with("Guest"));
        assert_eq!(guest.len(), "Guest".len() + 4);
        assert_eq!(store.display_nickname(), guest);

        store.set_nickname("  Neo ").unwrap();
        assert_eq!(store.nickname().as_deref(), Some("Neo"));
        assert_eq!(store.display_nickname(), "Neo");
        assert!(matches!(store.set_nickname(" "), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_dropped_writes_do_not_error() {
        let store = LocalStore::new(MemoryStorage::with_quota(64));
        store.storage().insert_raw(VISITOR_ID_KEY, "v");

        let topic = store
            .create_topic("general", &"long title ".repeat(20), None, "A")
            .unwrap();

        assert!(topic.title.starts_with("long title"));
        assert!(store.get_topics().is_empty());
    }
}
