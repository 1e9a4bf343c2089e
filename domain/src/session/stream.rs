//! Streaming events for inference server communication.
//!
//! [`StreamEvent`] represents individual events in a streaming chat response,
//! enabling incremental display of model output as it's generated.
//! [`PullProgress`] carries status lines of a model download.

/// An event in a streaming model response.
///
/// Bridges the infrastructure-level stream (newline-delimited JSON from the
/// inference server) to the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// The server marked the response as done.
    Completed,
    /// An error reported by the server mid-stream.
    Error(String),
}

/// Status update while a model is downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullProgress {
    /// Server-reported phase, e.g. `pulling manifest` or `success`.
    pub status: String,
    /// Bytes downloaded so far for the current layer.
    pub completed: Option<u64>,
    /// Total bytes of the current layer.
    pub total: Option<u64>,
}

impl PullProgress {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            completed: None,
            total: None,
        }
    }

    /// Percentage of the current layer, when sizes are known
    pub fn percent(&self) -> Option<u8> {
        match (self.completed, self.total) {
            (Some(done), Some(total)) if total > 0 => {
                Some(((done.min(total) * 100) / total) as u8)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for PullProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.percent() {
            Some(pct) => write!(f, "{} ({}%)", self.status, pct),
            None => f.write_str(&self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pull_progress_percent() {
        let progress = PullProgress {
            status: "pulling 6a0746a1ec1a".to_string(),
            completed: Some(512),
            total: Some(2048),
        };
        assert_eq!(progress.percent(), Some(25));
        assert_eq!(progress.to_string(), "pulling 6a0746a1ec1a (25%)");
    }

    #[test]
    fn pull_progress_without_sizes() {
        let progress = PullProgress::status("verifying sha256 digest");
        assert_eq!(progress.percent(), None);
        assert_eq!(progress.to_string(), "verifying sha256 digest");

        let zero = PullProgress {
            status: "pulling".to_string(),
            completed: Some(0),
            total: Some(0),
        };
        assert_eq!(zero.percent(), None);
    }
}
