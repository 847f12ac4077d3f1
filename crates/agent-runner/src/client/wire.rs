//! Responses API request and payload shapes

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::{Agent, AgentTool};
use crate::error::{Result, RunnerError};
use crate::history::ConversationItem;
use crate::runtime::{RunResult, RuntimeNotification};

/// The model decides when to call the hosted tools
const TOOL_CHOICE: &str = "auto";

#[derive(Debug, Serialize)]
pub struct ResponsesRequest<'a> {
    pub model: &'a str,
    pub instructions: &'a str,
    pub input: &'a [ConversationItem],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
    pub tool_choice: &'static str,
    pub parallel_tool_calls: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningSpec>,
    pub stream: bool,
    pub store: bool,
}

impl<'a> ResponsesRequest<'a> {
    pub fn new(agent: &'a Agent, input: &'a [ConversationItem], stream: bool) -> Self {
        let settings = &agent.model_settings;
        Self {
            model: &agent.model,
            instructions: &agent.instructions,
            input,
            tools: agent.tools.iter().map(|t| ToolSpec::from(*t)).collect(),
            tool_choice: TOOL_CHOICE,
            parallel_tool_calls: settings.parallel_tool_calls,
            reasoning: settings.reasoning_summary.then(|| ReasoningSpec {
                summary: "auto".to_string(),
            }),
            stream,
            store: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl From<AgentTool> for ToolSpec {
    fn from(tool: AgentTool) -> Self {
        match tool {
            AgentTool::WebSearch => Self { kind: "web_search" },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReasoningSpec {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

/// A complete response object
#[derive(Debug, Default, Deserialize)]
pub struct ResponseObject {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

impl ResponseObject {
    /// Final text is the last assistant message; each message becomes a
    /// history item.
    pub fn into_run_result(self) -> Result<RunResult> {
        if self.status.as_deref() == Some("failed") {
            let message = self
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "response failed".to_string());
            return Err(RunnerError::stream(message));
        }

        let new_items: Vec<ConversationItem> = self
            .output
            .iter()
            .filter(|item| item.is_message())
            .map(|item| ConversationItem::assistant(item.text_segments().concat()))
            .collect();
        let final_output = new_items
            .last()
            .map(|item| item.content.clone())
            .unwrap_or_default();

        Ok(RunResult::new(final_output, new_items))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub action: Option<Value>,
}

impl OutputItem {
    pub fn is_message(&self) -> bool {
        self.kind == "message"
    }

    pub fn is_tool_call(&self) -> bool {
        self.kind.ends_with("_call")
    }

    pub fn text_segments(&self) -> Vec<String> {
        self.content
            .iter()
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// One `data:` payload of the event stream
#[derive(Debug, Deserialize)]
pub struct StreamPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub delta: Option<String>,
    #[serde(default)]
    pub item: Option<OutputItem>,
    #[serde(default)]
    pub response: Option<ResponseObject>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StreamPayload {
    pub fn into_notification(self) -> Result<RuntimeNotification> {
        let notification = match self.kind.as_str() {
            "response.reasoning_summary_text.delta" | "response.reasoning_text.delta" => {
                RuntimeNotification::ReasoningDelta {
                    delta: self.delta.unwrap_or_default(),
                }
            }
            "response.output_text.delta" => RuntimeNotification::OutputDelta {
                delta: self.delta.unwrap_or_default(),
            },
            "response.output_item.added" => match self.item {
                Some(item) if item.is_tool_call() => RuntimeNotification::ToolCalled { kind: item.kind },
                _ => RuntimeNotification::Unknown { kind: self.kind },
            },
            "response.output_item.done" => match self.item {
                Some(item) if item.is_message() => RuntimeNotification::MessageCompleted {
                    segments: item.text_segments(),
                },
                Some(item) if item.is_tool_call() => RuntimeNotification::ToolOutput {
                    output: item.output.or(item.action),
                    status: item.status,
                },
                _ => RuntimeNotification::Unknown { kind: self.kind },
            },
            "response.completed" => {
                let response = self.response.unwrap_or_default();
                RuntimeNotification::RunCompleted(response.into_run_result()?)
            }
            "response.failed" => {
                let message = self
                    .response
                    .and_then(|r| r.error)
                    .map(|e| e.message)
                    .unwrap_or_else(|| "response failed".to_string());
                return Err(RunnerError::stream(message));
            }
            "error" => {
                return Err(RunnerError::stream(
                    self.message.unwrap_or_else(|| "unknown stream error".to_string()),
                ))
            }
            _ => RuntimeNotification::Unknown { kind: self.kind },
        };
        Ok(notification)
    }
}
