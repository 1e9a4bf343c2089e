//! Model identifier value object

use super::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Model pulled when the selected one is missing, and the default selection.
pub const DEFAULT_MODEL_ID: &str = "llama3.2:1b";

/// Tag Ollama assumes when a model name carries none.
const IMPLICIT_TAG: &str = "latest";

/// Name of an inference model as known to the server (Value Object)
///
/// Ollama names take the form `name[:tag]`, e.g. `llama3.2:1b`. A name
/// without a tag refers to the `latest` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId(String);

impl ModelId {
    /// Create a model id, rejecting empty or whitespace-only names
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidModel(id));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Model name without the tag
    pub fn name(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(name, _)| name)
    }

    /// Model tag, `latest` when none is given
    pub fn tag(&self) -> &str {
        self.0.split_once(':').map_or(IMPLICIT_TAG, |(_, tag)| tag)
    }

    /// Check whether two ids refer to the same installed model
    ///
    /// `llama3` and `llama3:latest` are the same model.
    pub fn refers_to(&self, other: &ModelId) -> bool {
        self.name() == other.name() && self.tag() == other.tag()
    }
}

impl Default for ModelId {
    fn default() -> Self {
        ModelId(DEFAULT_MODEL_ID.to_string())
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ModelId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::new(s)
    }
}

impl AsRef<str> for ModelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ModelId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModelId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ModelId::new(s).map_err(serde::de::Error::custom)
    }
}
