//! File-backed storage: one file per key under a data directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::StoragePort;
use crate::errors::AppError;

/// Persistent storage rooted at a directory.
///
/// Each write lands in a temporary sibling first and is renamed over the
/// target, so a key is either fully replaced or left untouched.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| self.root.join(key))
    }
}

impl StoragePort for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self
            .path_for(key)
            .ok_or_else(|| AppError::StorageRead(format!("Invalid storage key {:?}", key)))?;

        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::StorageRead(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self
            .path_for(key)
            .ok_or_else(|| AppError::StorageWrite(format!("Invalid storage key {:?}", key)))?;

        fs::create_dir_all(&self.root).map_err(|e| {
            AppError::StorageWrite(format!(
                "Failed to create {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)
            .and_then(|()| fs::rename(&tmp, &path))
            .map_err(|e| {
                fs::remove_file(&tmp).ok();
                AppError::StorageWrite(format!("Failed to write {}: {}", path.display(), e))
            })
    }
}
