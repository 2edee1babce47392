//! Message store collaborator: an append-only, ordered conversation log.
//!
//! The bot reads the whole log once at startup to build its keyword table
//! and train its models, appends every message it sees or sends, and reads
//! the most recent slice when the knowledge responder needs context.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;
use crate::message::ChatMessage;

/// Append-only message log.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message at the end of the log.
    async fn append(&self, message: &ChatMessage) -> Result<(), StoreError>;

    /// Every stored message, oldest first.
    async fn all(&self) -> Result<Vec<ChatMessage>, StoreError>;

    /// The last `limit` messages, oldest first.
    async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        let mut messages = self.all().await?;
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.split_off(skip))
    }
}

/// In-process store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    messages: Mutex<Vec<ChatMessage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// A store pre-filled with `messages`.
    pub fn with_messages(messages: Vec<ChatMessage>) -> Self {
        MemoryStore {
            messages: Mutex::new(messages),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn append(&self, message: &ChatMessage) -> Result<(), StoreError> {
        self.messages.lock().push(message.clone());
        Ok(())
    }

    async fn all(&self) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self.messages.lock().clone())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        let messages = self.messages.lock();
        let skip = messages.len().saturating_sub(limit);
        Ok(messages[skip..].to_vec())
    }
}

/// File-backed store: one JSON-encoded [`ChatMessage`] per line.
///
/// A missing file reads as an empty log and is created on first append.
/// Appends from this process are serialized; concurrent writers from other
/// processes are not coordinated.
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonlStore {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw log, or `None` if nothing has been written yet.
    async fn read_log(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Non-blank lines of `content` with their 1-based line numbers.
fn records(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| (index + 1, line))
}

fn parse_record((line, text): (usize, &str)) -> Result<ChatMessage, StoreError> {
    serde_json::from_str(text).map_err(|source| StoreError::Malformed { line, source })
}

#[async_trait]
impl MessageStore for JsonlStore {
    async fn append(&self, message: &ChatMessage) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(message).map_err(StoreError::Encode)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<ChatMessage>, StoreError> {
        match self.read_log().await? {
            Some(content) => records(&content).map(parse_record).collect(),
            None => Ok(Vec::new()),
        }
    }

    /// Only the last `limit` records are decoded.
    async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let Some(content) = self.read_log().await? else {
            return Ok(Vec::new());
        };

        let mut tail = VecDeque::new();
        for record in records(&content) {
            if tail.len() == limit {
                tail.pop_front();
            }
            tail.push_back(record);
        }
        tail.into_iter().map(parse_record).collect()
    }
}
