//! Shared handler state

use chat_application::{ModelCatalog, RespondUseCase};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub respond: RespondUseCase,
    /// Read once at startup
    pub catalog: Arc<ModelCatalog>,
}

impl AppState {
    pub fn new(respond: RespondUseCase, catalog: ModelCatalog) -> Self {
        Self {
            respond,
            catalog: Arc::new(catalog),
        }
    }
}
