//! Response sink port
//!
//! Defines where the responder publishes partial answers and user notices.
//! The presentation layer consumes these to update the chat view.

use async_trait::async_trait;
use chat_domain::ConversationHistory;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

/// The consumer of a response went away (e.g. the browser disconnected).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Response consumer disconnected")]
pub struct SinkClosed;

/// Transient message shown to the user while a response is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Receiver of incremental response state
///
/// `publish` is awaited for every chunk, so a slow consumer paces the
/// producer. An error means nobody is listening and the response should stop.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Publish the full history, including the in-progress answer
    async fn publish(&self, history: &ConversationHistory) -> Result<(), SinkClosed>;

    /// Show a transient notice to the user
    async fn notify(&self, notice: Notice) -> Result<(), SinkClosed>;
}

/// One update delivered through a [`ChannelSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseUpdate {
    Snapshot(ConversationHistory),
    Notice(Notice),
}

/// [`ResponseSink`] backed by a bounded channel.
///
/// With a capacity of 1 each publish waits until the previous snapshot has
/// been taken by the consumer.
pub struct ChannelSink {
    sender: mpsc::Sender<ResponseUpdate>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<ResponseUpdate>) -> Self {
        Self { sender }
    }

    /// Create a sink and the receiver consuming it
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ResponseUpdate>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl ResponseSink for ChannelSink {
    async fn publish(&self, history: &ConversationHistory) -> Result<(), SinkClosed> {
        self.sender
            .send(ResponseUpdate::Snapshot(history.clone()))
            .await
            .map_err(|_| SinkClosed)
    }

    async fn notify(&self, notice: Notice) -> Result<(), SinkClosed> {
        self.sender
            .send(ResponseUpdate::Notice(notice))
            .await
            .map_err(|_| SinkClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_domain::Turn;
    use std::time::Duration;

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        let (sink, mut rx) = ChannelSink::channel(4);
        let history = ConversationHistory::from_turns(vec![Turn::new("q", "a")]);

        sink.notify(Notice::info("hello")).await.unwrap();
        sink.publish(&history).await.unwrap();

        assert_eq!(
            rx.recv().await,
            Some(ResponseUpdate::Notice(Notice::info("hello")))
        );
        assert_eq!(rx.recv().await, Some(ResponseUpdate::Snapshot(history)));
    }

    #[tokio::test]
    async fn test_channel_sink_reports_closed_receiver() {
        let (sink, rx) = ChannelSink::channel(1);
        drop(rx);

        assert_eq!(
            sink.publish(&ConversationHistory::new()).await,
            Err(SinkClosed)
        );
        assert_eq!(sink.notify(Notice::info("x")).await, Err(SinkClosed));
    }

    #[tokio::test]
    async fn test_channel_sink_waits_for_consumer() {
        let (sink, mut rx) = ChannelSink::channel(1);
        let first = ConversationHistory::from_turns(vec![Turn::new("q", "a")]);
        let second = ConversationHistory::from_turns(vec![Turn::new("q", "ab")]);

        sink.publish(&first).await.unwrap();

        let pending = sink.publish(&second);
        tokio::pin!(pending);
        assert!(
            tokio::time::timeout(Duration::from_millis(50), &mut pending)
                .await
                .is_err(),
            "second publish must wait until the first snapshot is taken"
        );

        assert_eq!(rx.recv().await, Some(ResponseUpdate::Snapshot(first)));
        tokio::time::timeout(Duration::from_secs(1), pending)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rx.recv().await, Some(ResponseUpdate::Snapshot(second.clone())));
    }

    #[test]
    fn test_notice_serializes_message() {
        let json = serde_json::to_string(&Notice::info("careful")).unwrap();
        assert_eq!(json, r#"{"message":"careful"}"#);
    }
}
