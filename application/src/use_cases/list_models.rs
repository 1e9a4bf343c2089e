//! List Models use case.
//!
//! Reads the models installed on the inference server once at startup and
//! combines them with the configured default into the choices offered to the
//! user.

use crate::ports::model_server::{ModelServer, ServerError};
use chat_domain::ModelId;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while listing models
#[derive(Error, Debug)]
pub enum ListModelsError {
    #[error("{0}: please ensure that ollama is running, use `ollama serve`.")]
    ServerUnavailable(#[source] ServerError),
}

/// Models the user can choose from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelCatalog {
    /// Models installed on the server, in server order.
    pub installed: Vec<ModelId>,
    /// Model preselected in the UI.
    pub default: ModelId,
}

impl ModelCatalog {
    pub fn new(installed: Vec<ModelId>, default: ModelId) -> Self {
        Self { installed, default }
    }

    /// Whether a model (or an equivalent tag spelling) is installed
    pub fn is_installed(&self, model: &ModelId) -> bool {
        self.installed.iter().any(|m| m.refers_to(model))
    }

    /// Dropdown choices: installed models, with the default first if it is
    /// not installed yet
    pub fn choices(&self) -> Vec<ModelId> {
        let mut choices = Vec::with_capacity(self.installed.len() + 1);
        if !self.is_installed(&self.default) {
            choices.push(self.default.clone());
        }
        choices.extend(self.installed.iter().cloned());
        choices
    }
}

/// Use case for reading the model directory of the inference server.
pub struct ListModelsUseCase {
    server: Arc<dyn ModelServer>,
}

impl ListModelsUseCase {
    pub fn new(server: Arc<dyn ModelServer>) -> Self {
        Self { server }
    }

    /// Query the installed models
    ///
    /// An unreachable server is fatal for the caller: the chat cannot work
    /// without it.
    pub async fn execute(&self, default: ModelId) -> Result<ModelCatalog, ListModelsError> {
        let installed = self
            .server
            .list_models()
            .await
            .map_err(ListModelsError::ServerUnavailable)?;

        info!("Found {} installed model(s)", installed.len());
        debug!(
            "Installed models: {}",
            installed
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(ModelCatalog::new(installed, default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::model_server::{PullHandle, StreamHandle};
    use async_trait::async_trait;

    struct FixedServer {
        models: Result<Vec<ModelId>, ServerError>,
    }

    #[async_trait]
    impl ModelServer for FixedServer {
        async fn list_models(&self) -> Result<Vec<ModelId>, ServerError> {
            self.models.clone()
        }

        async fn chat_stream(
            &self,
            _model: &ModelId,
            _prompt: &str,
        ) -> Result<StreamHandle, ServerError> {
            unreachable!("listing models never chats")
        }

        async fn pull_model(&self, _model: &ModelId) -> Result<PullHandle, ServerError> {
            unreachable!("listing models never pulls")
        }
    }

    fn ids(names: &[&str]) -> Vec<ModelId> {
        names.iter().map(|n| n.parse().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_lists_installed_models() {
        let server = Arc::new(FixedServer {
            models: Ok(ids(&["llama3.2:1b", "mistral:latest"])),
        });
        let catalog = ListModelsUseCase::new(server)
            .execute(ModelId::default())
            .await
            .unwrap();

        assert_eq!(catalog.installed, ids(&["llama3.2:1b", "mistral:latest"]));
        assert_eq!(catalog.choices(), ids(&["llama3.2:1b", "mistral:latest"]));
    }

    #[tokio::test]
    async fn test_unreachable_server_mentions_ollama_serve() {
        let server = Arc::new(FixedServer {
            models: Err(ServerError::ConnectionError("connection refused".into())),
        });
        let err = ListModelsUseCase::new(server)
            .execute(ModelId::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Connection error: connection refused: please ensure that ollama is running, use `ollama serve`."
        );
    }

    #[test]
    fn test_missing_default_is_offered_first() {
        let catalog = ModelCatalog::new(ids(&["mistral:latest"]), ModelId::default());
        assert!(!catalog.is_installed(&ModelId::default()));
        assert_eq!(catalog.choices(), ids(&["llama3.2:1b", "mistral:latest"]));
    }

    #[test]
    fn test_default_matches_implicit_latest_tag() {
        let catalog = ModelCatalog::new(ids(&["phi3:latest"]), "phi3".parse().unwrap());
        assert!(catalog.is_installed(&"phi3".parse().unwrap()));
        assert_eq!(catalog.choices(), ids(&["phi3:latest"]));
    }
}
