//! The local store: every piece of forum state, kept in a flat key-value
//! namespace.
//!
//! Reads never fail: a missing or malformed value reads as empty. Writes never
//! fail either: a rejected write is logged and dropped. Callers keep whatever
//! they computed in memory until the next reload.

mod local_store;

pub use local_store::*;
