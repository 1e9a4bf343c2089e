//! Infrastructure layer for ollama-chat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod ollama;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileChatConfig, FileConfig, FileServerConfig,
    FileWebConfig,
};
pub use ollama::{DEFAULT_OLLAMA_URL, OllamaError, OllamaModelServer, OllamaSettings};
