//! Ollama model server implementation.
//!
//! Provides [`OllamaModelServer`] which implements [`ModelServer`] over the
//! Ollama HTTP API. Streaming responses are read on a background task and
//! forwarded through bounded channels; dropping the receiving handle stops
//! the task and closes the connection.

use crate::ollama::error::{OllamaError, Result};
use crate::ollama::ndjson::LineBuffer;
use crate::ollama::protocol::{
    ChatChunk, ChatMessage, ChatRequest, ErrorResponse, PullRequest, PullStatus, TagsResponse,
};
use async_trait::async_trait;
use chat_application::{ModelServer, PullHandle, ServerError, StreamHandle};
use chat_domain::{ModelId, PullProgress, StreamEvent};
use futures::StreamExt;
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Base URL of a default local Ollama installation.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Buffered events between the reader task and the consumer.
const STREAM_CHANNEL_CAPACITY: usize = 32;

/// Connection settings for [`OllamaModelServer`].
#[derive(Debug, Clone)]
pub struct OllamaSettings {
    pub base_url: String,
    /// Time allowed to establish a connection. Requests themselves have no
    /// deadline so long generations are never cut off.
    pub connect_timeout: Option<Duration>,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            connect_timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// [`ModelServer`] backed by a local Ollama server.
pub struct OllamaModelServer {
    client: Client,
    base_url: String,
}

impl OllamaModelServer {
    pub fn new(settings: &OllamaSettings) -> std::result::Result<Self, ServerError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ServerError::ConnectionError(e.to_string()))?;

        info!("Using Ollama at {}", settings.base_url);

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Send a request, turning non-2xx statuses into [`OllamaError::Api`]
    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<Response> {
        let response = request.send().await.map_err(|source| OllamaError::Connect {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("Unknown").to_string()
                } else {
                    body.trim().to_string()
                }
            });

        debug!("{} returned HTTP {}: {}", url, status.as_u16(), message);
        Err(OllamaError::Api {
            code: status.as_u16(),
            message,
        })
    }

    async fn fetch_tags(&self) -> Result<Vec<ModelId>> {
        let url = self.endpoint("tags");
        let response = self.send(self.client.get(&url), &url).await?;
        let body = response.text().await?;
        let tags: TagsResponse =
            serde_json::from_str(&body).map_err(|e| OllamaError::ParseError {
                error: e.to_string(),
                raw: body.clone(),
            })?;

        Ok(tags
            .models
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| match ModelId::new(entry.name) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("Skipping model entry: {}", e);
                    None
                }
            })
            .collect())
    }

    async fn start_chat(&self, model: &ModelId, prompt: &str) -> Result<Response> {
        let url = self.endpoint("chat");
        let body = ChatRequest {
            model: model.as_str(),
            messages: vec![ChatMessage::user(prompt)],
            stream: true,
        };
        debug!("POST {} model={} ({} prompt bytes)", url, model, prompt.len());
        self.send(self.client.post(&url).json(&body), &url).await
    }

    async fn start_pull(&self, model: &ModelId) -> Result<Response> {
        let url = self.endpoint("pull");
        let body = PullRequest {
            model: model.as_str(),
            stream: true,
        };
        info!("Pulling model {}", model);
        self.send(self.client.post(&url).json(&body), &url).await
    }
}

#[async_trait]
impl ModelServer for OllamaModelServer {
    async fn list_models(&self) -> std::result::Result<Vec<ModelId>, ServerError> {
        Ok(self.fetch_tags().await?)
    }

    async fn chat_stream(
        &self,
        model: &ModelId,
        prompt: &str,
    ) -> std::result::Result<StreamHandle, ServerError> {
        let response = self.start_chat(model, prompt).await?;
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(forward_chat(response, tx));
        Ok(StreamHandle::new(rx))
    }

    async fn pull_model(&self, model: &ModelId) -> std::result::Result<PullHandle, ServerError> {
        let response = self.start_pull(model).await?;
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(forward_pull(response, tx));
        Ok(PullHandle::new(rx))
    }
}

/// What to do after decoding one line of a stream
enum LineOutcome<T> {
    /// Forward these items and keep reading
    Emit(Vec<T>),
    /// Forward these items and stop
    Finish(Vec<T>),
}

/// Decode NDJSON lines from `response` and forward the results to `tx`.
///
/// Returns `Ok(true)` if `decode` finished the stream, `Ok(false)` if the
/// body ended first or the receiver went away.
async fn forward_lines<T, F>(
    response: Response,
    tx: &mpsc::Sender<T>,
    mut decode: F,
) -> std::result::Result<bool, OllamaError>
where
    T: Send,
    F: FnMut(&str) -> LineOutcome<T>,
{
    let mut body = response.bytes_stream();
    let mut buffer = LineBuffer::new();
    let mut ended = false;

    while !ended {
        let lines = match body.next().await {
            Some(chunk) => buffer.push(&chunk?),
            None => {
                ended = true;
                buffer.finish().into_iter().collect()
            }
        };
        for line in lines {
            let (items, finish) = match decode(&line) {
                LineOutcome::Emit(items) => (items, false),
                LineOutcome::Finish(items) => (items, true),
            };
            for item in items {
                if tx.send(item).await.is_err() {
                    debug!("Stream consumer dropped, closing connection");
                    return Ok(false);
                }
            }
            if finish {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

async fn forward_chat(response: Response, tx: mpsc::Sender<StreamEvent>) {
    let mut chunks = 0usize;
    let result = forward_lines(response, &tx, |line| {
        let mut chunk: ChatChunk = match serde_json::from_str(line) {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("Ignoring malformed chat line ({}): {}", e, line);
                return LineOutcome::Emit(Vec::new());
            }
        };
        if let Some(error) = chunk.error.take() {
            return LineOutcome::Finish(vec![StreamEvent::Error(error)]);
        }

        let mut events = Vec::new();
        let content = chunk.content();
        if !content.is_empty() {
            chunks += 1;
            events.push(StreamEvent::Delta(content.to_string()));
        }
        if chunk.done {
            events.push(StreamEvent::Completed);
            return LineOutcome::Finish(events);
        }
        LineOutcome::Emit(events)
    })
    .await;

    match result {
        Ok(true) => {}
        Ok(false) if tx.is_closed() => {}
        Ok(false) => warn!(
            "Chat stream ended without a done marker after {} chunk(s), answer may be truncated",
            chunks
        ),
        Err(e) => {
            let _ = tx.send(StreamEvent::Error(e.to_string())).await;
        }
    }
}

async fn forward_pull(
    response: Response,
    tx: mpsc::Sender<std::result::Result<PullProgress, ServerError>>,
) {
    let result = forward_lines(response, &tx, |line| {
        let status: PullStatus = match serde_json::from_str(line) {
            Ok(status) => status,
            Err(e) => {
                warn!("Ignoring malformed pull line ({}): {}", e, line);
                return LineOutcome::Emit(Vec::new());
            }
        };
        match status.error {
            Some(error) => LineOutcome::Finish(vec![Err(ServerError::Reported(error))]),
            None => LineOutcome::Emit(vec![Ok(status.into())]),
        }
    })
    .await;

    if let Err(e) = result {
        let _ = tx.send(Err(e.into())).await;
    }
}
