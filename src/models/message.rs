//! Message and attachment models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{now_iso, now_millis};

/// Message lists keyed by topic ID.
pub type MessagesByTopic = BTreeMap<String, Vec<Message>>;

/// A single post in a topic thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    /// Free-text nickname
    pub author: String,
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub files: Vec<Attachment>,
}

impl Message {
    /// Build a message stamped with the current time.
    pub fn new(author: impl Into<String>, content: impl Into<String>, files: Vec<Attachment>) -> Self {
        Self {
            id: format!("m{}", now_millis()),
            author: author.into(),
            content: content.into(),
            timestamp: now_iso(),
            files,
        }
    }
}

/// How an attachment is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Video,
    File,
}

impl AttachmentKind {
    /// Classify by MIME type: `image/*`, `video/*`, everything else is a file.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            AttachmentKind::Image
        } else if mime.starts_with("video/") {
            AttachmentKind::Video
        } else {
            AttachmentKind::File
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::Image => "image",
            AttachmentKind::Video => "video",
            AttachmentKind::File => "file",
        }
    }
}

/// A named, typed reference to user-selected media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    /// Locally generated reference; not durable across reloads
    pub url: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_kind_from_mime() {
        assert_eq!(AttachmentKind::from_mime("image/png"), AttachmentKind::Image);
        assert_eq!(AttachmentKind::from_mime("Video/MP4"), AttachmentKind::Video);
        assert_eq!(AttachmentKind::from_mime("text/plain"), AttachmentKind::File);
        assert_eq!(AttachmentKind::from_mime(""), AttachmentKind::File);
    }

    #[test]
    fn test_attachment_serializes_type_field() {
        let attachment = Attachment {
            name: "screenshot.jpg".to_string(),
            url: "blob:local/1".to_string(),
            kind: AttachmentKind::Image,
        };
        let value = serde_json::to_value(&attachment).unwrap();
        assert_eq!(value["type"], "image");
        assert_eq!(value["name"], "screenshot.jpg");
    }

    #[test]
    fn test_message_new_stamps_id_and_time() {
        let message = Message::new("Guest1234", "hi", Vec::new());
        assert!(message.id.starts_with('m'));
        assert!(message.id[1..].parse::<i64>().is_ok());
        assert!(message.timestamp.ends_with('Z'));
        assert!(message.files.is_empty());
    }

    #[test]
    fn test_message_without_files_parses() {
        let json = r#"{"id":"m1","author":"A","content":"hello","timestamp":"t"}"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert!(message.files.is_empty());
    }
}
