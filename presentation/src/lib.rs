//! Presentation layer for ollama-chat
//!
//! This crate contains CLI definitions, console output and the web chat
//! surface (HTML page, JSON and server-sent event endpoints).

pub mod cli;
pub mod output;
pub mod web;

// Re-export commonly used types
pub use cli::commands::Cli;
pub use output::console::ConsoleFormatter;
pub use web::{AppState, router, serve};
