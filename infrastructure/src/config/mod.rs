//! Configuration file loading for ollama-chat
//!
//! The priority order (highest to lowest):
//!
//! 1. `OLLAMA_CHAT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./ollama-chat.toml` or `./.ollama-chat.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/ollama-chat/config.toml`
//! 5. Default values
//!
//! Command-line flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_WEB_HOST, DEFAULT_WEB_PORT, FileChatConfig, FileConfig,
    FileServerConfig, FileWebConfig,
};
pub use loader::ConfigLoader;
