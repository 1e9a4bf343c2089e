//! Application layer for ollama-chat
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ChatConfig;
pub use ports::{
    model_server::{ModelServer, PullHandle, ServerError, StreamHandle},
    response_sink::{ChannelSink, Notice, ResponseSink, ResponseUpdate, SinkClosed},
};
pub use use_cases::list_models::{ListModelsError, ListModelsUseCase, ModelCatalog};
pub use use_cases::respond::{RespondError, RespondInput, RespondUseCase};
