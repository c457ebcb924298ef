//! Key-value storage backends for the local store.
//!
//! The store only ever reads and overwrites whole values under a handful of
//! fixed keys, the same way the browser front end uses `localStorage`.

mod file;
mod memory;

pub use file::*;
pub use memory::*;

use crate::errors::AppError;

/// Topics by category, JSON.
pub const TOPICS_KEY: &str = "2hacker_topics";
/// Messages by topic, JSON.
pub const MESSAGES_KEY: &str = "2hacker_messages";
/// View and visitor statistics, JSON.
pub const STATS_KEY: &str = "2hacker_stats";
/// Anonymous visitor token, plain string.
pub const VISITOR_ID_KEY: &str = "2hacker_visitor_id";
/// Display nickname, plain string.
pub const NICKNAME_KEY: &str = "2hacker_nickname";

/// A flat string-to-string namespace.
///
/// Implementations report failures as [`AppError::StorageRead`] or
/// [`AppError::StorageWrite`]; a key that was never written reads as `None`.
pub trait StoragePort {
    fn read(&self, key: &str) -> Result<Option<String>, AppError>;
    fn write(&self, key: &str, value: &str) -> Result<(), AppError>;
}

impl<S: StoragePort + ?Sized> StoragePort for &S {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), AppError> {
        (**self).write(key, value)
    }
}
