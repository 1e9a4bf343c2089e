//! Chat configuration: model selection.
//!
//! [`ChatConfig`] holds the model preselected in the UI and the model that is
//! downloaded when the server reports the selected one as missing.

use chat_domain::ModelId;
use serde::{Deserialize, Serialize};

/// Model selection parameters used by the responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model preselected for new conversations.
    pub default_model: ModelId,
    /// Model downloaded once when the selected model is not installed.
    pub fallback_model: ModelId,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_model: ModelId::default(),
            fallback_model: ModelId::default(),
        }
    }
}

impl ChatConfig {
    // ==================== Builder Methods ====================

    pub fn with_default_model(mut self, model: ModelId) -> Self {
        self.default_model = model;
        self
    }

    pub fn with_fallback_model(mut self, model: ModelId) -> Self {
        self.fallback_model = model;
        self
    }
}
