//! Respond use case.
//!
//! Answers one user message by streaming the model output into the
//! conversation history.
//!
//! 1. Validate the message (empty input never reaches the server)
//! 2. Flatten the committed history plus the message into one prompt
//! 3. Append an in-progress turn and publish it
//! 4. Stream the answer, publishing the whole history after every chunk
//! 5. Commit the turn once the stream is exhausted
//!
//! If the server does not know the selected model, the configured fallback
//! model is downloaded exactly once. When the fallback is the selected model
//! the request is sent again; otherwise the user is asked to switch models.
//! On any failure the in-progress turn is dropped, so the history only grows
//! on success.

use crate::config::ChatConfig;
use crate::ports::model_server::{ModelServer, PULL_SUCCESS, ServerError, StreamHandle};
use crate::ports::response_sink::{Notice, ResponseSink, SinkClosed};
use chat_domain::{
    ConversationHistory, DomainError, ModelId, StreamEvent, UserPrompt, format_prompt,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Bytes of the user message included in log lines.
const LOG_PREVIEW_BYTES: usize = 100;

/// Errors that can occur while responding
#[derive(Error, Debug)]
pub enum RespondError {
    #[error("{0}")]
    InvalidInput(#[from] DomainError),

    #[error("{reason}: {model} not a valid Ollama model id, see https://ollama.com/search.")]
    InvalidFallbackModel { model: ModelId, reason: String },

    #[error(
        "Model '{requested}' is not installed, downloaded '{installed}' instead. Select it and send your message again."
    )]
    ModelReplaced {
        requested: ModelId,
        installed: ModelId,
    },

    #[error("{message}: status code {code}")]
    ServerStatus { code: u16, message: String },

    #[error("{0}")]
    Server(ServerError),

    #[error("Response consumer disconnected")]
    Disconnected(#[from] SinkClosed),
}

impl From<ServerError> for RespondError {
    fn from(e: ServerError) -> Self {
        match e.status_code() {
            Some(code) => RespondError::ServerStatus {
                code,
                message: e.to_string(),
            },
            None => RespondError::Server(e),
        }
    }
}

impl RespondError {
    /// Whether the user can fix this by changing their input or selection
    pub fn is_recoverable(&self) -> bool {
        match self {
            RespondError::InvalidInput(e) => e.is_user_error(),
            RespondError::ModelReplaced { .. } => true,
            _ => false,
        }
    }
}

/// Input for the [`RespondUseCase`].
#[derive(Debug, Clone)]
pub struct RespondInput {
    /// The message as typed; validated by the use case.
    pub message: String,
    /// Model selected by the user.
    pub model: ModelId,
    /// Conversation so far.
    pub history: ConversationHistory,
}

impl RespondInput {
    pub fn new(message: impl Into<String>, model: ModelId, history: ConversationHistory) -> Self {
        Self {
            message: message.into(),
            model,
            history,
        }
    }
}

/// Use case for streaming one answer into the conversation.
#[derive(Clone)]
pub struct RespondUseCase {
    server: Arc<dyn ModelServer>,
    config: ChatConfig,
}

impl RespondUseCase {
    pub fn new(server: Arc<dyn ModelServer>, config: ChatConfig) -> Self {
        Self { server, config }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Respond to a message, publishing partial state through `sink`.
    ///
    /// Returns the history with the new turn committed.
    pub async fn execute(
        &self,
        input: RespondInput,
        sink: &dyn ResponseSink,
    ) -> Result<ConversationHistory, RespondError> {
        let prompt = UserPrompt::new(input.message)?;
        let model = input.model;
        let mut history = input.history;

        info!(
            "Responding with model {}: {}",
            model,
            prompt.preview(LOG_PREVIEW_BYTES)
        );

        let full_prompt = format_prompt(history.committed_turns(), prompt.content());
        history.begin_turn(&prompt)?;

        match self.run(&model, &full_prompt, &mut history, sink).await {
            Ok(()) => {
                let turn = history.commit()?;
                info!("Response complete ({} bytes)", turn.assistant.len());
                Ok(history)
            }
            Err(e) => {
                history.discard_pending();
                warn!("Response failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        model: &ModelId,
        prompt: &str,
        history: &mut ConversationHistory,
        sink: &dyn ResponseSink,
    ) -> Result<(), RespondError> {
        sink.publish(history).await?;

        let handle = match self.server.chat_stream(model, prompt).await {
            Ok(handle) => handle,
            Err(e) if e.is_model_not_found() => {
                self.recover_missing_model(model, e, sink).await?;
                self.server.chat_stream(model, prompt).await?
            }
            Err(e) => return Err(e.into()),
        };

        self.stream_answer(handle, history, sink).await
    }

    async fn stream_answer(
        &self,
        mut handle: StreamHandle,
        history: &mut ConversationHistory,
        sink: &dyn ResponseSink,
    ) -> Result<(), RespondError> {
        let mut answer = String::new();
        let mut chunks = 0usize;

        while let Some(event) = handle.next().await {
            match event {
                StreamEvent::Delta(chunk) => {
                    answer.push_str(&chunk);
                    chunks += 1;
                    history.set_pending_answer(answer.as_str())?;
                    sink.publish(history).await?;
                }
                StreamEvent::Completed => break,
                StreamEvent::Error(message) => {
                    return Err(ServerError::Reported(message).into());
                }
            }
        }

        debug!("Stream finished after {} chunk(s)", chunks);
        Ok(())
    }

    /// Download the fallback model once.
    ///
    /// Returns `Ok` only when the downloaded model is the one requested, in
    /// which case the caller may send the request again.
    async fn recover_missing_model(
        &self,
        requested: &ModelId,
        not_found: ServerError,
        sink: &dyn ResponseSink,
    ) -> Result<(), RespondError> {
        let fallback = &self.config.fallback_model;
        warn!(
            "Model {} not found ({}), downloading {}",
            requested, not_found, fallback
        );
        sink.notify(Notice::info(format!(
            "Attempting to download model '{fallback}'..."
        )))
        .await?;

        let invalid = |e: ServerError| RespondError::InvalidFallbackModel {
            model: fallback.clone(),
            reason: e.to_string(),
        };

        let mut handle = self.server.pull_model(fallback).await.map_err(invalid)?;
        let mut last_status = String::new();
        while let Some(update) = handle.next().await {
            let progress = update.map_err(invalid)?;
            debug!("Pull {}: {}", fallback, progress);
            if progress.status != last_status {
                sink.notify(Notice::info(progress.to_string())).await?;
                last_status = progress.status;
            }
        }
        if last_status != PULL_SUCCESS {
            return Err(invalid(ServerError::StreamError(
                "download ended before completion".to_string(),
            )));
        }

        info!("Downloaded model {}", fallback);
        sink.notify(Notice::info(format!("Model '{fallback}' downloaded.")))
            .await?;

        if fallback.refers_to(requested) {
            Ok(())
        } else {
            Err(RespondError::ModelReplaced {
                requested: requested.clone(),
                installed: fallback.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::model_server::PullHandle;
    use async_trait::async_trait;
    use chat_domain::{PullProgress, Turn};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    // ==================== Test Mocks ====================

    type ChatScript = Result<Vec<StreamEvent>, ServerError>;
    type PullScript = Result<Vec<Result<PullProgress, ServerError>>, ServerError>;

    #[derive(Default)]
    struct MockServer {
        chats: Mutex<VecDeque<ChatScript>>,
        pull: Mutex<Option<PullScript>>,
        prompts: Mutex<Vec<(ModelId, String)>>,
        pulls: Mutex<Vec<ModelId>>,
    }

    impl MockServer {
        fn with_chat(self, script: ChatScript) -> Self {
            self.chats.lock().unwrap().push_back(script);
            self
        }

        fn with_pull(self, script: PullScript) -> Self {
            *self.pull.lock().unwrap() = Some(script);
            self
        }

        fn chat_calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn pulled(&self) -> Vec<ModelId> {
            self.pulls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelServer for MockServer {
        async fn list_models(&self) -> Result<Vec<ModelId>, ServerError> {
            Ok(Vec::new())
        }

        async fn chat_stream(
            &self,
            model: &ModelId,
            prompt: &str,
        ) -> Result<StreamHandle, ServerError> {
            self.prompts
                .lock()
                .unwrap()
                .push((model.clone(), prompt.to_string()));
            let events = self
                .chats
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ServerError::InvalidResponse("no script".into())))?;

            let (tx, rx) = mpsc::channel(events.len().max(1));
            for event in events {
                tx.try_send(event).unwrap();
            }
            Ok(StreamHandle::new(rx))
        }

        async fn pull_model(&self, model: &ModelId) -> Result<PullHandle, ServerError> {
            self.pulls.lock().unwrap().push(model.clone());
            let updates = self
                .pull
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(ServerError::InvalidResponse("no script".into())))?;

            let (tx, rx) = mpsc::channel(updates.len().max(1));
            for update in updates {
                tx.try_send(update).unwrap();
            }
            Ok(PullHandle::new(rx))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        snapshots: Mutex<Vec<ConversationHistory>>,
        notices: Mutex<Vec<Notice>>,
        closed: bool,
    }

    impl RecordingSink {
        fn closed() -> Self {
            Self {
                closed: true,
                ..Self::default()
            }
        }

        fn answers(&self) -> Vec<String> {
            self.snapshots
                .lock()
                .unwrap()
                .iter()
                .map(|h| h.last().unwrap().assistant.clone())
                .collect()
        }

        fn notice_messages(&self) -> Vec<String> {
            self.notices
                .lock()
                .unwrap()
                .iter()
                .map(|n| n.message.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ResponseSink for RecordingSink {
        async fn publish(&self, history: &ConversationHistory) -> Result<(), SinkClosed> {
            if self.closed {
                return Err(SinkClosed);
            }
            self.snapshots.lock().unwrap().push(history.clone());
            Ok(())
        }

        async fn notify(&self, notice: Notice) -> Result<(), SinkClosed> {
            if self.closed {
                return Err(SinkClosed);
            }
            self.notices.lock().unwrap().push(notice);
            Ok(())
        }
    }

    fn deltas(chunks: &[&str]) -> Vec<StreamEvent> {
        let mut events: Vec<StreamEvent> = chunks
            .iter()
            .map(|c| StreamEvent::Delta(c.to_string()))
            .collect();
        events.push(StreamEvent::Completed);
        events
    }

    fn model(name: &str) -> ModelId {
        name.parse().unwrap()
    }

    fn use_case(server: &Arc<MockServer>) -> RespondUseCase {
        RespondUseCase::new(server.clone(), ChatConfig::default())
    }

    fn not_found(name: &str) -> ServerError {
        ServerError::ModelNotFound(format!("model \"{name}\" not found, try pulling it first"))
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_empty_message_never_contacts_server() {
        let server = Arc::new(MockServer::default());
        let sink = RecordingSink::default();

        for message in ["", "   "] {
            let input = RespondInput::new(message, ModelId::default(), ConversationHistory::new());
            let err = use_case(&server).execute(input, &sink).await.unwrap_err();

            assert!(matches!(
                err,
                RespondError::InvalidInput(DomainError::EmptyPrompt)
            ));
            assert!(err.is_recoverable());
            assert_eq!(
                err.to_string(),
                "Empty user prompt detected, please write something."
            );
        }
        assert_eq!(server.chat_calls(), 0);
        assert!(server.pulled().is_empty());
        assert!(sink.snapshots.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_streamed_chunks_commit_in_order() {
        let server = Arc::new(
            MockServer::default().with_chat(Ok(deltas(&["The ", "capital ", "is Lima."]))),
        );
        let sink = RecordingSink::default();
        let prior = ConversationHistory::from_turns(vec![Turn::new("Hi", "Hello!")]);

        let input = RespondInput::new("Capital of Peru?", ModelId::default(), prior);
        let history = use_case(&server).execute(input, &sink).await.unwrap();

        assert_eq!(history.len(), 2);
        assert!(!history.is_in_progress());
        assert_eq!(
            history.last(),
            Some(&Turn::new("Capital of Peru?", "The capital is Lima."))
        );
        assert_eq!(
            sink.answers(),
            vec!["", "The ", "The capital ", "The capital is Lima."]
        );
    }

    #[tokio::test]
    async fn test_prompt_contains_prior_turns_once() {
        let server = Arc::new(MockServer::default().with_chat(Ok(deltas(&["ok"]))));
        let prior = ConversationHistory::from_turns(vec![Turn::new("a", "b")]);

        let input = RespondInput::new("c", model("mistral"), prior);
        use_case(&server)
            .execute(input, &RecordingSink::default())
            .await
            .unwrap();

        let prompts = server.prompts.lock().unwrap();
        assert_eq!(
            prompts.as_slice(),
            &[(
                model("mistral"),
                "User: a\nAssistant: b\nUser: c\nAssistant:".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_history_grows_by_one_per_submission() {
        let server = Arc::new(
            MockServer::default()
                .with_chat(Ok(deltas(&["one"])))
                .with_chat(Ok(deltas(&["two"]))),
        );
        let use_case = use_case(&server);
        let sink = RecordingSink::default();

        let history = use_case
            .execute(
                RespondInput::new("1", ModelId::default(), ConversationHistory::new()),
                &sink,
            )
            .await
            .unwrap();
        assert_eq!(history.len(), 1);

        let history = use_case
            .execute(RespondInput::new("2", ModelId::default(), history), &sink)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[1], Turn::new("2", "two"));
    }

    #[tokio::test]
    async fn test_missing_model_failed_download_names_fallback() {
        let server = Arc::new(
            MockServer::default()
                .with_chat(Err(not_found("made-up")))
                .with_pull(Err(ServerError::Status {
                    code: 500,
                    message: "pull model manifest: file does not exist".into(),
                })),
        );
        let sink = RecordingSink::default();

        let input = RespondInput::new("hi", model("made-up"), ConversationHistory::new());
        let err = use_case(&server).execute(input, &sink).await.unwrap_err();

        assert_eq!(server.pulled(), vec![model("llama3.2:1b")]);
        assert_eq!(server.chat_calls(), 1);
        assert_eq!(
            err.to_string(),
            "pull model manifest: file does not exist: llama3.2:1b not a valid Ollama model id, see https://ollama.com/search."
        );
        assert!(!err.to_string().contains("made-up"));
        assert!(!err.is_recoverable());
        assert_eq!(
            sink.notice_messages(),
            vec!["Attempting to download model 'llama3.2:1b'..."]
        );
    }

    #[tokio::test]
    async fn test_missing_model_error_line_during_download() {
        let server = Arc::new(
            MockServer::default()
                .with_chat(Err(not_found("llama3.2:1b")))
                .with_pull(Ok(vec![
                    Ok(PullProgress::status("pulling manifest")),
                    Err(ServerError::Reported("file does not exist".into())),
                ])),
        );

        let input = RespondInput::new("hi", ModelId::default(), ConversationHistory::new());
        let err = use_case(&server)
            .execute(input, &RecordingSink::default())
            .await
            .unwrap_err();

        assert!(matches!(err, RespondError::InvalidFallbackModel { .. }));
        assert_eq!(server.pulled().len(), 1);
        assert_eq!(server.chat_calls(), 1);
    }

    #[tokio::test]
    async fn test_download_of_selected_model_retries_once() {
        let server = Arc::new(
            MockServer::default()
                .with_chat(Err(not_found("llama3.2:1b")))
                .with_chat(Ok(deltas(&["Bang", "kok"])))
                .with_pull(Ok(vec![
                    Ok(PullProgress::status("pulling manifest")),
                    Ok(PullProgress {
                        status: "pulling 74701a8c35f6".into(),
                        completed: Some(10),
                        total: Some(100),
                    }),
                    Ok(PullProgress {
                        status: "pulling 74701a8c35f6".into(),
                        completed: Some(100),
                        total: Some(100),
                    }),
                    Ok(PullProgress::status("success")),
                ])),
        );
        let sink = RecordingSink::default();

        let input = RespondInput::new("Capital?", ModelId::default(), ConversationHistory::new());
        let history = use_case(&server).execute(input, &sink).await.unwrap();

        assert_eq!(server.pulled(), vec![model("llama3.2:1b")]);
        assert_eq!(server.chat_calls(), 2);
        assert_eq!(history.last(), Some(&Turn::new("Capital?", "Bangkok")));
        assert_eq!(
            sink.notice_messages(),
            vec![
                "Attempting to download model 'llama3.2:1b'...",
                "pulling manifest",
                "pulling 74701a8c35f6 (10%)",
                "success",
                "Model 'llama3.2:1b' downloaded.",
            ]
        );
    }

    #[tokio::test]
    async fn test_download_of_other_model_asks_user_to_switch() {
        let server = Arc::new(
            MockServer::default()
                .with_chat(Err(not_found("made-up")))
                .with_pull(Ok(vec![Ok(PullProgress::status("success"))])),
        );

        let prior = ConversationHistory::from_turns(vec![Turn::new("a", "b")]);
        let input = RespondInput::new("hi", model("made-up"), prior);
        let err = use_case(&server)
            .execute(input, &RecordingSink::default())
            .await
            .unwrap_err();

        assert!(err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Model 'made-up' is not installed, downloaded 'llama3.2:1b' instead. Select it and send your message again."
        );
        assert_eq!(server.chat_calls(), 1);
        assert_eq!(server.pulled().len(), 1);
    }

    #[tokio::test]
    async fn test_download_without_success_is_invalid() {
        let server = Arc::new(
            MockServer::default()
                .with_chat(Err(not_found("llama3.2:1b")))
                .with_pull(Ok(vec![Ok(PullProgress::status("pulling manifest"))])),
        );

        let input = RespondInput::new("hi", ModelId::default(), ConversationHistory::new());
        let err = use_case(&server)
            .execute(input, &RecordingSink::default())
            .await
            .unwrap_err();

        assert!(matches!(err, RespondError::InvalidFallbackModel { .. }));
        assert_eq!(server.chat_calls(), 1);
    }

    #[tokio::test]
    async fn test_configured_fallback_is_downloaded() {
        let server = Arc::new(
            MockServer::default()
                .with_chat(Err(not_found("made-up")))
                .with_pull(Err(ServerError::Reported("not found".into()))),
        );
        let config = ChatConfig::default().with_fallback_model(model("phi3:mini"));
        let use_case = RespondUseCase::new(server.clone(), config);

        let input = RespondInput::new("hi", model("made-up"), ConversationHistory::new());
        let err = use_case
            .execute(input, &RecordingSink::default())
            .await
            .unwrap_err();

        assert_eq!(server.pulled(), vec![model("phi3:mini")]);
        assert!(err.to_string().contains("phi3:mini not a valid Ollama model id"));
    }

    #[tokio::test]
    async fn test_other_server_error_reports_status() {
        let server = Arc::new(MockServer::default().with_chat(Err(ServerError::Status {
            code: 500,
            message: "out of memory".into(),
        })));

        let input = RespondInput::new("hi", ModelId::default(), ConversationHistory::new());
        let err = use_case(&server)
            .execute(input, &RecordingSink::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "out of memory: status code 500");
        assert!(server.pulled().is_empty());
    }

    #[tokio::test]
    async fn test_error_mid_stream_aborts() {
        let server = Arc::new(MockServer::default().with_chat(Ok(vec![
            StreamEvent::Delta("par".into()),
            StreamEvent::Error("model runner crashed".into()),
        ])));

        let input = RespondInput::new("hi", ModelId::default(), ConversationHistory::new());
        let err = use_case(&server)
            .execute(input, &RecordingSink::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RespondError::Server(ServerError::Reported(ref m)) if m == "model runner crashed"
        ));
    }

    #[tokio::test]
    async fn test_disconnected_consumer_stops_response() {
        let server = Arc::new(MockServer::default().with_chat(Ok(deltas(&["x"]))));

        let input = RespondInput::new("hi", ModelId::default(), ConversationHistory::new());
        let err = use_case(&server)
            .execute(input, &RecordingSink::closed())
            .await
            .unwrap_err();

        assert!(matches!(err, RespondError::Disconnected(SinkClosed)));
        assert_eq!(server.chat_calls(), 0);
    }

    #[test]
    fn test_server_error_conversion() {
        let with_code: RespondError = ServerError::ModelNotFound("gone".into()).into();
        assert_eq!(with_code.to_string(), "gone: status code 404");

        let without_code: RespondError = ServerError::ConnectionError("refused".into()).into();
        assert_eq!(without_code.to_string(), "Connection error: refused");
    }
}
