//! Domain layer for ollama-chat
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Conversation History**: ordered (user, assistant) turns; the last turn
//!   may be in progress while a response streams in
//! - **Prompt Formatting**: a history plus a new message flattens into one
//!   `User:` / `Assistant:` transcript sent to the model
//! - **Model Id**: name of a model installed on the inference server

pub mod conversation;
pub mod core;
pub mod session;

// Re-export commonly used types
pub use conversation::{
    formatter::{ASSISTANT_LABEL, USER_LABEL, format_prompt},
    history::{ConversationHistory, Turn},
};
pub use core::{
    error::DomainError,
    model::{DEFAULT_MODEL_ID, ModelId},
    prompt::UserPrompt,
};
pub use session::stream::{PullProgress, StreamEvent};
