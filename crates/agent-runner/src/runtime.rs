//! Interface to the hosted agent runtime

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::agent::Agent;
use crate::error::Result;
use crate::history::ConversationItem;

/// Outcome of one agent run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResult {
    /// Final text produced by the agent
    pub final_output: String,
    /// Conversation items the run produced
    pub new_items: Vec<ConversationItem>,
}

impl RunResult {
    pub fn new(final_output: impl Into<String>, new_items: Vec<ConversationItem>) -> Self {
        Self {
            final_output: final_output.into(),
            new_items,
        }
    }

    /// Items to append to the conversation before the next stage
    pub fn to_input_items(&self) -> Vec<ConversationItem> {
        self.new_items.clone()
    }
}

/// Low-level notification surfaced while a streamed run progresses
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeNotification {
    /// The active agent changed
    AgentUpdated { name: String },
    /// Fragment of reasoning text
    ReasoningDelta { delta: String },
    /// Fragment of output text
    OutputDelta { delta: String },
    /// A tool call started
    ToolCalled { kind: String },
    /// A tool call produced a result
    ToolOutput {
        output: Option<serde_json::Value>,
        status: Option<String>,
    },
    /// A message finished, with its text segments
    MessageCompleted { segments: Vec<String> },
    /// The run finished
    RunCompleted(RunResult),
    /// Anything else the runtime sent
    Unknown { kind: String },
}

/// Stream of notifications for one streamed run
pub type NotificationStream = BoxStream<'static, Result<RuntimeNotification>>;

/// Executes agents on the hosted runtime.
///
/// The runtime is stateless per call; the full conversation is sent as input
/// every time.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Run to completion and return only the result
    async fn run(&self, agent: &Agent, input: &[ConversationItem]) -> Result<RunResult>;

    /// Run while streaming notifications.
    ///
    /// A successful stream ends with `RuntimeNotification::RunCompleted`.
    async fn run_streamed(
        &self,
        agent: &Agent,
        input: &[ConversationItem],
    ) -> Result<NotificationStream>;
}
