//! Error types for the Ollama adapter

use chat_application::ServerError;
use thiserror::Error;

/// Result type alias for Ollama operations
pub type Result<T> = std::result::Result<T, OllamaError>;

/// Errors that can occur when communicating with the Ollama server
#[derive(Error, Debug)]
pub enum OllamaError {
    #[error("Failed to reach Ollama at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Ollama returned HTTP {code}: {message}")]
    Api { code: u16, message: String },

    #[error("Failed to read response stream: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse response: {error}\nRaw response: {raw}")]
    ParseError { error: String, raw: String },
}

impl From<OllamaError> for ServerError {
    fn from(e: OllamaError) -> Self {
        match e {
            OllamaError::Connect { .. } => ServerError::ConnectionError(e.to_string()),
            OllamaError::Api { code: 404, message } => ServerError::ModelNotFound(message),
            OllamaError::Api { code, message } => ServerError::Status { code, message },
            OllamaError::Transport(e) => ServerError::StreamError(e.to_string()),
            OllamaError::ParseError { .. } => ServerError::InvalidResponse(e.to_string()),
        }
    }
}
