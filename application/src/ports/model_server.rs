//! Model Server port
//!
//! Defines the interface for communicating with the local inference server.

use async_trait::async_trait;
use chat_domain::{ModelId, PullProgress, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// HTTP status the server uses for a missing model.
pub const NOT_FOUND: u16 = 404;

/// Errors that can occur during inference server operations
///
/// Server-reported failures display the server's own message so it can be
/// shown to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServerError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("{0}")]
    ModelNotFound(String),

    #[error("{message}")]
    Status { code: u16, message: String },

    #[error("Stream error: {0}")]
    StreamError(String),

    /// Error line sent by the server inside a stream
    #[error("{0}")]
    Reported(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ServerError {
    /// HTTP status code reported by the server, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServerError::ModelNotFound(_) => Some(NOT_FOUND),
            ServerError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check if this error means the requested model is not installed
    pub fn is_model_not_found(&self) -> bool {
        matches!(self, ServerError::ModelNotFound(_))
    }
}

/// Interface to the local inference server
///
/// This port defines how the application layer talks to the model server.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ModelServer: Send + Sync {
    /// Names of the models installed on the server
    async fn list_models(&self) -> Result<Vec<ModelId>, ServerError>;

    /// Send a single user message and stream the answer
    ///
    /// A missing model is reported as [`ServerError::ModelNotFound`] before
    /// any event is delivered.
    async fn chat_stream(&self, model: &ModelId, prompt: &str)
    -> Result<StreamHandle, ServerError>;

    /// Start downloading a model
    async fn pull_model(&self, model: &ModelId) -> Result<PullHandle, ServerError>;
}

/// Handle for receiving streaming events from a chat call.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. The stream ends with
/// [`StreamEvent::Completed`] or [`StreamEvent::Error`]; a channel that closes
/// without either means the server cut the response short.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event; `None` once the stream is exhausted
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}

/// Status reported when a download finishes.
pub const PULL_SUCCESS: &str = "success";

/// Handle for receiving status updates of a model download.
pub struct PullHandle {
    pub receiver: mpsc::Receiver<Result<PullProgress, ServerError>>,
}

impl PullHandle {
    pub fn new(receiver: mpsc::Receiver<Result<PullProgress, ServerError>>) -> Self {
        Self { receiver }
    }

    /// Receive the next status update; `None` once the download stream ends
    pub async fn next(&mut self) -> Option<Result<PullProgress, ServerError>> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServerError::ModelNotFound("model 'x' not found".into()).status_code(),
            Some(404)
        );
        assert_eq!(
            ServerError::Status {
                code: 500,
                message: "boom".into()
            }
            .status_code(),
            Some(500)
        );
        assert_eq!(ServerError::ConnectionError("refused".into()).status_code(), None);
    }

    #[test]
    fn test_server_message_displayed_verbatim() {
        let err = ServerError::ModelNotFound("model \"nope\" not found, try pulling it first".into());
        assert_eq!(err.to_string(), "model \"nope\" not found, try pulling it first");
        assert!(err.is_model_not_found());
    }
}
