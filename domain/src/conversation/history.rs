//! Conversation history entity.

use crate::core::error::DomainError;
use crate::core::prompt::UserPrompt;
use serde::{Deserialize, Serialize};

/// A single exchange: what the user said and what the assistant answered.
///
/// Serialized as a two-element array `[user, assistant]`, the shape chat
/// widgets exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
        }
    }
}

impl From<(String, String)> for Turn {
    fn from((user, assistant): (String, String)) -> Self {
        Self { user, assistant }
    }
}

impl From<Turn> for (String, String) {
    fn from(turn: Turn) -> Self {
        (turn.user, turn.assistant)
    }
}

/// Ordered record of turns used as conversational context.
///
/// At most one turn is in progress at a time, and it is always the last one.
/// The in-progress marker is transient: only the turns themselves are
/// serialized, so a deserialized history is fully committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
    #[serde(skip)]
    pending: bool,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a committed history from existing turns
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            pending: false,
        }
    }

    /// All turns, including the in-progress one
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Turns whose answers are final
    pub fn committed_turns(&self) -> &[Turn] {
        if self.pending {
            &self.turns[..self.turns.len() - 1]
        } else {
            &self.turns
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Whether the last turn is still receiving its answer
    pub fn is_in_progress(&self) -> bool {
        self.pending
    }

    /// Append a new turn with an empty answer and mark it in progress
    pub fn begin_turn(&mut self, prompt: &UserPrompt) -> Result<(), DomainError> {
        if self.pending {
            return Err(DomainError::TurnInProgress);
        }
        self.turns.push(Turn::new(prompt.content(), ""));
        self.pending = true;
        Ok(())
    }

    /// Replace the answer of the in-progress turn
    pub fn set_pending_answer(&mut self, answer: impl Into<String>) -> Result<(), DomainError> {
        let turn = self.pending_turn_mut()?;
        turn.assistant = answer.into();
        Ok(())
    }

    /// Make the in-progress turn permanent
    pub fn commit(&mut self) -> Result<&Turn, DomainError> {
        if !self.pending {
            return Err(DomainError::NoPendingTurn);
        }
        self.pending = false;
        self.turns.last().ok_or(DomainError::NoPendingTurn)
    }

    /// Drop the in-progress turn, returning it
    pub fn discard_pending(&mut self) -> Option<Turn> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        self.turns.pop()
    }

    fn pending_turn_mut(&mut self) -> Result<&mut Turn, DomainError> {
        if !self.pending {
            return Err(DomainError::NoPendingTurn);
        }
        self.turns.last_mut().ok_or(DomainError::NoPendingTurn)
    }
}
