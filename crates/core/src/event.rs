//! Progress events emitted while a research workflow runs

use serde::{Deserialize, Serialize};

/// First workflow stage: decides which items the patient needs
pub const PLANNER_STAGE: &str = "planner";
/// Second workflow stage: prices and sources the planned items
pub const COST_RESEARCH_STAGE: &str = "cost_research";
/// Pseudo-stage used when the streaming attempt fails
pub const STREAMING_STAGE: &str = "streaming";
/// Pseudo-stage wrapping the buffered fallback run
pub const FALLBACK_STAGE: &str = "fallback";
/// Pseudo-stage marking the end of the whole workflow
pub const FINAL_STAGE: &str = "final";

/// Kind of a stage event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageEventKind {
    StageStart,
    ReasoningDelta,
    OutputDelta,
    ToolCall,
    ToolOutput,
    Message,
    AgentUpdated,
    StageComplete,
    StageOutput,
    StageError,
}

impl StageEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StageStart => "stage_start",
            Self::ReasoningDelta => "reasoning_delta",
            Self::OutputDelta => "output_delta",
            Self::ToolCall => "tool_call",
            Self::ToolOutput => "tool_output",
            Self::Message => "message",
            Self::AgentUpdated => "agent_updated",
            Self::StageComplete => "stage_complete",
            Self::StageOutput => "stage_output",
            Self::StageError => "stage_error",
        }
    }
}

/// A UI-agnostic progress event for one stage.
///
/// Transient: subscribers consume these as they arrive, nothing stores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEvent {
    /// Stage the event belongs to
    pub stage: String,

    /// Event kind
    #[serde(rename = "type")]
    pub kind: StageEventKind,

    /// Text payload (delta fragment, tool name, message text, ...)
    #[serde(default)]
    pub content: String,
}

impl StageEvent {
    pub fn new(stage: impl Into<String>, kind: StageEventKind, content: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            kind,
            content: content.into(),
        }
    }

    pub fn stage_start(stage: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(stage, StageEventKind::StageStart, content)
    }

    pub fn stage_complete(stage: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(stage, StageEventKind::StageComplete, content)
    }

    pub fn stage_output(stage: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(stage, StageEventKind::StageOutput, content)
    }

    pub fn stage_error(stage: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(stage, StageEventKind::StageError, content)
    }

    pub fn is(&self, stage: &str, kind: StageEventKind) -> bool {
        self.stage == stage && self.kind == kind
    }
}
