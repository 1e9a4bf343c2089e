//! Application-level configuration.
//!
//! - [`ChatConfig`]: model selection defaults and the missing-model fallback

pub mod chat_config;

pub use chat_config::ChatConfig;
