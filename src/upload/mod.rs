//! Attachment selection rules.
//!
//! Files are checked as a batch when picked: the whole selection is accepted
//! or rejected. Only name, size and MIME type are looked at, never the bytes.

use crate::errors::AppError;
use crate::models::{Attachment, AttachmentKind};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// A file picked by the user but not yet attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn kind(&self) -> AttachmentKind {
        AttachmentKind::from_mime(&self.mime)
    }

    /// Turn the selection into an attachment record pointing at `url`.
    pub fn into_attachment(self, url: String) -> Attachment {
        let kind = self.kind();
        Attachment {
            name: self.name,
            url,
            kind,
        }
    }
}

/// Limits applied to one message's attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_size_mb: u64,
    /// Exact MIME types accepted; `None` accepts anything
    pub allowed_types: Option<Vec<String>>,
}

impl UploadLimits {
    pub const DEFAULT_MAX_FILES: usize = 5;
    pub const DEFAULT_MAX_SIZE_MB: u64 = 10;

    /// Check a new selection against files already chosen for the same message.
    pub fn validate_selection(
        &self,
        already_selected: usize,
        selected: &[SelectedFile],
    ) -> Result<(), AppError> {
        if already_selected + selected.len() > self.max_files {
            return Err(AppError::Validation(format!(
                "Maximum number of files: {}",
                self.max_files
            )));
        }

        let max_bytes = self.max_size_mb.saturating_mul(BYTES_PER_MB);
        if let Some(file) = selected.iter().find(|f| f.size > max_bytes) {
            return Err(AppError::Validation(format!(
                "Maximum file size: {}MB ({} is {} bytes)",
                self.max_size_mb, file.name, file.size
            )));
        }

        if let Some(allowed) = &self.allowed_types {
            if selected.iter().any(|f| !allowed.contains(&f.mime)) {
                return Err(AppError::Validation(format!(
                    "Allowed file types: {}",
                    allowed.join(", ")
                )));
            }
        }

        Ok(())
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: Self::DEFAULT_MAX_FILES,
            max_size_mb: Self::DEFAULT_MAX_SIZE_MB,
            allowed_types: None,
        }
    }
}
