//! Ollama adapter
//!
//! Talks to a local Ollama server over its HTTP API and exposes it as a
//! [`ModelServer`](chat_application::ModelServer).

pub mod client;
pub mod error;
pub mod ndjson;
pub mod protocol;

pub use client::{DEFAULT_OLLAMA_URL, OllamaModelServer, OllamaSettings};
pub use error::OllamaError;
