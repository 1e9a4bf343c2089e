//! Ollama HTTP API message types.
//!
//! Only the fields this client reads or writes are modelled; unknown fields
//! in responses are ignored.

use chat_domain::PullProgress;
use serde::{Deserialize, Serialize};

/// Role of the single message sent per chat request.
pub const ROLE_USER: &str = "user";

/// One entry of `GET /api/tags`
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub name: String,
}

/// Response of `GET /api/tags`
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Option<Vec<ModelEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_USER.to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// One line of a streamed `POST /api/chat` response
#[derive(Debug, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatChunk {
    /// Text carried by this chunk, empty for bookkeeping lines
    pub fn content(&self) -> &str {
        self.message.as_ref().map_or("", |m| m.content.as_str())
    }
}

/// Body of `POST /api/pull`
#[derive(Debug, Serialize)]
pub struct PullRequest<'a> {
    pub model: &'a str,
    pub stream: bool,
}

/// One line of a streamed `POST /api/pull` response
#[derive(Debug, Deserialize)]
pub struct PullStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<PullStatus> for PullProgress {
    fn from(status: PullStatus) -> Self {
        PullProgress {
            status: status.status,
            completed: status.completed,
            total: status.total,
        }
    }
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
