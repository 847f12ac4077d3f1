//! Agent Runner - drives the life care research workflow
//!
//! Stages run in order against a hosted agent runtime, either buffered or
//! streamed. Streamed runs report progress as [`lcp_core::StageEvent`]s and
//! fall back to a buffered re-run when streaming fails.

mod agent;
mod client;
mod driver;
mod error;
mod history;
mod runtime;
mod stages;
mod translator;

#[cfg(any(test, feature = "testing"))]
pub mod scripted;

pub use agent::{Agent, AgentTool, ModelSettings, DEFAULT_MODEL};
pub use client::{ClientConfig, OpenAiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use driver::{ExecutionMode, StreamOutcome, WorkflowDriver, WorkflowOutput};
pub use error::{Result, RunnerError};
pub use history::{ConversationHistory, ConversationItem, MessageRole};
pub use runtime::{AgentRuntime, NotificationStream, RunResult, RuntimeNotification};
pub use stages::{
    cost_research_agent, life_care_stages, planner_agent, Stage, COST_RESEARCH_AGENT,
    PLANNER_AGENT,
};
pub use translator::{truncate_tool_output, EventTranslator, TOOL_OUTPUT_MAX_CHARS};
