//! Conversation domain.
//!
//! - [`history::ConversationHistory`]: ordered turns with one optional in-progress turn
//! - [`history::Turn`]: a (user, assistant) pair
//! - [`formatter::format_prompt`]: flatten a history into a single prompt

pub mod formatter;
pub mod history;
