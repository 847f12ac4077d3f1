//! Error types for agent-runner

use thiserror::Error;

/// Result type alias for runner operations
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Errors that can occur while running the research workflow
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A stage's call to the agent runtime failed
    #[error("Stage '{stage}' failed: {message}")]
    StageExecution { stage: String, message: String },

    /// The agent runtime answered with a non-success status
    #[error("Agent runtime returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Network failure talking to the agent runtime
    #[error("Agent runtime request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Payload from the agent runtime could not be decoded
    #[error("Failed to decode agent runtime payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The runtime reported a failure mid-stream
    #[error("Agent stream failed: {message}")]
    Stream { message: String },

    /// The stream closed without a completed run
    #[error("Agent stream ended before the run completed")]
    StreamEnded,

    /// No API key configured for the hosted runtime
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    /// The workflow was built without stages
    #[error("Workflow has no stages")]
    NoStages,
}

impl RunnerError {
    /// Wrap a runtime failure as a stage failure
    pub fn stage_failed(stage: impl Into<String>, source: RunnerError) -> Self {
        match source {
            already @ Self::StageExecution { .. } => already,
            other => Self::StageExecution {
                stage: stage.into(),
                message: other.to_string(),
            },
        }
    }

    /// Create an Api error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a Stream error
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }

    /// Name of the failed stage, if this is a stage failure
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::StageExecution { stage, .. } => Some(stage),
            _ => None,
        }
    }
}
