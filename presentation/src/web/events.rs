//! Server-sent events emitted by `POST /api/chat`.
//!
//! | event     | data                                        |
//! |-----------|---------------------------------------------|
//! | `history` | whole conversation, `[[user, assistant]..]` |
//! | `info`    | `{"message"}` progress notice               |
//! | `done`    | final conversation                          |
//! | `error`   | `{"message", "recoverable"}`                |
//!
//! `done` and `error` are terminal: exactly one of them ends every stream.

use axum::response::sse::Event;
use chat_application::{RespondError, ResponseUpdate};
use chat_domain::ConversationHistory;
use serde::Serialize;
use tracing::warn;

pub const EVENT_HISTORY: &str = "history";
pub const EVENT_INFO: &str = "info";
pub const EVENT_DONE: &str = "done";
pub const EVENT_ERROR: &str = "error";

#[derive(Debug, Serialize)]
struct ErrorPayload<'a> {
    message: &'a str,
    recoverable: bool,
}

fn json_event(name: &'static str, data: &impl Serialize) -> Event {
    Event::default()
        .event(name)
        .json_data(data)
        .unwrap_or_else(|e| {
            warn!("Failed to encode {} event: {}", name, e);
            error_event("Failed to encode response", false)
        })
}

pub fn update_event(update: ResponseUpdate) -> Event {
    match update {
        ResponseUpdate::Snapshot(history) => json_event(EVENT_HISTORY, &history),
        ResponseUpdate::Notice(notice) => json_event(EVENT_INFO, &notice),
    }
}

pub fn error_event(message: &str, recoverable: bool) -> Event {
    let payload = ErrorPayload {
        message,
        recoverable,
    };
    // Plain fields only, serialization cannot fail
    let data = serde_json::to_string(&payload).unwrap_or_default();
    Event::default().event(EVENT_ERROR).data(data)
}

/// Terminal event for a finished response
pub fn outcome_event(result: &Result<ConversationHistory, RespondError>) -> Event {
    match result {
        Ok(history) => json_event(EVENT_DONE, history),
        Err(e) => error_event(&e.to_string(), e.is_recoverable()),
    }
}
