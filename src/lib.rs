//! OpenForum
//!
//! An anonymous discussion forum whose entire state lives in a flat local
//! key-value store: categories, topics, threaded messages with attachments,
//! and view/visitor statistics.

pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod ownership;
pub mod storage;
pub mod store;
pub mod upload;

pub use errors::AppError;
pub use storage::{FileStorage, MemoryStorage, StoragePort};
pub use store::LocalStore;
