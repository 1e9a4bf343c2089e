//! User prompt value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A message typed by the user (Value Object)
///
/// Guaranteed non-empty. The text is kept exactly as typed; only the
/// emptiness check ignores surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserPrompt {
    content: String,
}

impl UserPrompt {
    /// Create a prompt, rejecting empty or whitespace-only input
    pub fn new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::EmptyPrompt);
        }
        Ok(Self { content })
    }

    /// Get the prompt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Leading slice of the prompt for log lines (UTF-8 safe)
    pub fn preview(&self, max_bytes: usize) -> &str {
        if self.content.len() <= max_bytes {
            return &self.content;
        }
        let mut end = max_bytes;
        while end > 0 && !self.content.is_char_boundary(end) {
            end -= 1;
        }
        &self.content[..end]
    }
}

impl std::fmt::Display for UserPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}

impl TryFrom<String> for UserPrompt {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        UserPrompt::new(s)
    }
}

impl From<UserPrompt> for String {
    fn from(prompt: UserPrompt) -> Self {
        prompt.content
    }
}
