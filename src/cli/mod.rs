//! Command-line front end.
//!
//! Each command maps onto store calls the way the browser pages do: opening a
//! category or a topic records a view, the forms create topics and messages.

mod views;

pub use views::*;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::errors::AppError;
use crate::models::{default_categories, find_category, sort_by_last_active, ViewScope};
use crate::storage::StoragePort;
use crate::store::LocalStore;
use crate::upload::{SelectedFile, UploadLimits};

#[derive(Debug, Parser)]
#[command(name = "openforum")]
#[command(about = "Anonymous discussion forum kept in local storage")]
pub struct Cli {
    /// Storage directory, overrides OPENFORUM_DATA_DIR
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List categories
    Categories,
    /// List the topics of a category, most recently active first
    Topics { category: String },
    /// Show a topic thread
    Show { topic: String },
    /// Create a topic
    New {
        category: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Post a message to a topic
    Post {
        topic: String,
        text: String,
        /// File to attach; repeat for several
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,
    },
    /// Delete a topic created from this storage
    Delete { topic: String },
    /// Show or set the nickname
    Nick { name: Option<String> },
}

/// Execute one command and return what should be printed.
pub fn run<S: StoragePort>(
    command: Command,
    store: &LocalStore<S>,
    limits: &UploadLimits,
) -> Result<String, AppError> {
    match command {
        Command::Categories => {
            let rows: Vec<_> = default_categories()
                .iter()
                .map(|c| (c, store.category_summary(c.id)))
                .collect();
            Ok(render_categories(&rows))
        }
        Command::Topics { category } => {
            if find_category(&category).is_none() {
                return Err(AppError::NotFound(format!("Category {} not found", category)));
            }
            let counts = store.record_view(ViewScope::Category, &category);
            let mut topics = store.list_topics(&category);
            sort_by_last_active(&mut topics);
            Ok(render_topic_list(&category, &topics, counts))
        }
        Command::Show { topic } => {
            let (category_id, topic) = store
                .find_topic(&topic)
                .ok_or_else(|| AppError::NotFound(format!("Topic {} not found", topic)))?;
            let counts = store.record_view(
                ViewScope::Topic {
                    category_id: &category_id,
                },
                &topic.id,
            );
            let messages = store.messages_for(&topic.id);
            let owned = store.owns_topic(&topic);
            Ok(render_thread(&category_id, &topic, &messages, counts, owned))
        }
        Command::New {
            category,
            title,
            description,
        } => {
            let author = store.display_nickname();
            let topic = store.create_topic(&category, &title, description.as_deref(), &author)?;
            Ok(format!("Created topic {} \"{}\"", topic.id, topic.title))
        }
        Command::Post {
            topic,
            text,
            attachments,
        } => {
            let selected = attachments
                .iter()
                .map(|path| select_file(path))
                .collect::<Result<Vec<_>, _>>()?;
            limits.validate_selection(0, &selected)?;

            let files = selected
                .into_iter()
                .zip(&attachments)
                .map(|(file, path)| file.into_attachment(file_url(path)))
                .collect();

            let author = store.display_nickname();
            let message = store.send_message(&topic, &author, &text, files)?;
            Ok(format!("Posted {} to {}", message.id, topic))
        }
        Command::Delete { topic } => {
            let (category_id, _) = store
                .find_topic(&topic)
                .ok_or_else(|| AppError::NotFound(format!("Topic {} not found", topic)))?;
            store.delete_owned_topic(&category_id, &topic)?;
            Ok(format!("Deleted topic {}", topic))
        }
        Command::Nick { name: Some(name) } => {
            store.set_nickname(&name)?;
            Ok(format!("Nickname set to {}", name.trim()))
        }
        Command::Nick { name: None } => Ok(store.display_nickname()),
    }
}

fn select_file(path: &Path) -> Result<SelectedFile, AppError> {
    let metadata = fs::metadata(path).map_err(|e| {
        AppError::Validation(format!("Cannot read attachment {}: {}", path.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(AppError::Validation(format!(
            "Attachment {} is not a file",
            path.display()
        )));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    Ok(SelectedFile {
        name,
        mime,
        size: metadata.len(),
    })
}

fn file_url(path: &Path) -> String {
    let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}
