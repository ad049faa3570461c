//! Chat request models.
//!
//! The chat client posts the whole conversation on every turn. The last
//! message is the question being asked; everything before it is history.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Author of a chat message.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single message of the conversation.
///
/// Assistant messages keep the framed text they were streamed with,
/// including any trailing source document block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Body of a chat request.
///
/// ```json
/// {
///   "messages": [
///     { "role": "user", "content": "What is in the report?" },
///     { "role": "assistant", "content": "It covers...##SOURCE_DOCUMENTS##[...]" },
///     { "role": "user", "content": "Who wrote it?" }
///   ]
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Split the conversation into the current question and the history
    /// preceding it. Returns `None` for an empty conversation.
    pub fn split(&self) -> Option<(&str, &[ChatMessage])> {
        let (last, history) = self.messages.split_last()?;
        Some((last.content.as_str(), history))
    }
}
