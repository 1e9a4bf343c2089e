//! HTTP handlers

use super::events::{error_event, outcome_event, update_event};
use super::page::INDEX_HTML;
use super::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Html;
use chat_application::{ChannelSink, RespondError, RespondInput};
use chat_domain::{ConversationHistory, ModelId};
use futures::{Stream, StreamExt, stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio::sync::oneshot;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

/// Body of `POST /api/chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Empty or missing selects the default model
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub history: ConversationHistory,
}

/// Body of `GET /api/models`
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelId>,
    pub default: ModelId,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.catalog.choices(),
        default: state.catalog.default.clone(),
    })
}

/// Stream one answer as server-sent events.
///
/// The responder runs on its own task and publishes through a channel of
/// capacity one, so it only produces as fast as the client reads. When the
/// client goes away the channel closes and the responder stops.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let model = request
        .model
        .as_deref()
        .and_then(|m| ModelId::new(m).ok())
        .unwrap_or_else(|| state.catalog.default.clone());
    let input = RespondInput::new(request.message, model, request.history);

    let (sink, updates) = ChannelSink::channel(1);
    let (result_tx, result_rx) = oneshot::channel();
    let respond = state.respond.clone();

    tokio::spawn(async move {
        let result = respond.execute(input, &sink).await;
        drop(sink);

        if let Err(RespondError::Disconnected(_)) = &result {
            debug!("Client disconnected mid-response");
            return;
        }
        if result_tx.send(result).is_err() {
            warn!("Response finished after the event stream was dropped");
        }
    });

    let outcome = stream::once(async move {
        match result_rx.await {
            Ok(result) => outcome_event(&result),
            Err(_) => error_event("The response stopped unexpectedly", false),
        }
    });

    let events = ReceiverStream::new(updates)
        .map(update_event)
        .chain(outcome)
        .map(Ok::<_, Infallible>);

    Sse::new(events).keep_alive(KeepAlive::default())
}
