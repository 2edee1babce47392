//! Chat message records exchanged with the store and the knowledge responder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message of the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Transport-assigned id; 0 for messages the bot composed itself.
    pub id: u64,
    pub author_id: u64,
    pub author_username: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// A message stamped with the current time.
    pub fn new(id: u64, author_id: u64, author_username: impl Into<String>, content: impl Into<String>) -> Self {
        ChatMessage {
            id,
            author_id,
            author_username: author_username.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Who produced a turn of history, from the knowledge responder's viewpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A history entry handed to the knowledge responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub text: String,
}

impl HistoryTurn {
    /// Messages written by `bot_author_id` become [`Role::Model`] turns.
    pub fn from_message(message: &ChatMessage, bot_author_id: u64) -> Self {
        let role = if message.author_id == bot_author_id {
            Role::Model
        } else {
            Role::User
        };
        HistoryTurn {
            role,
            text: message.content.clone(),
        }
    }
}
