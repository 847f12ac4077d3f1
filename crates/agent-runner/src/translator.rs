//! Translate runtime notifications into stage events

use lcp_core::{StageEvent, StageEventKind};
use serde_json::Value;
use tracing::debug;

use crate::runtime::RuntimeNotification;

/// Tool output longer than this is cut
pub const TOOL_OUTPUT_MAX_CHARS: usize = 200;

/// Marker appended to cut tool output
pub const ELLIPSIS: &str = "...";

/// Maps runtime notifications to UI-agnostic stage events
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTranslator;

impl EventTranslator {
    pub fn new() -> Self {
        Self
    }

    /// Translate one notification for `stage`.
    ///
    /// Returns an empty list for notifications that carry nothing to show.
    pub fn translate(&self, stage: &str, notification: &RuntimeNotification) -> Vec<StageEvent> {
        let event = |kind, content: String| vec![StageEvent::new(stage, kind, content)];

        match notification {
            RuntimeNotification::ReasoningDelta { delta } => {
                event(StageEventKind::ReasoningDelta, delta.clone())
            }
            RuntimeNotification::OutputDelta { delta } => {
                event(StageEventKind::OutputDelta, delta.clone())
            }
            RuntimeNotification::ToolCalled { kind } => event(StageEventKind::ToolCall, kind.clone()),
            RuntimeNotification::ToolOutput { output, status } => event(
                StageEventKind::ToolOutput,
                tool_output_text(output.as_ref(), status.as_deref()),
            ),
            RuntimeNotification::MessageCompleted { segments } => {
                let text = segments.join("\n").trim().to_string();
                if text.is_empty() {
                    Vec::new()
                } else {
                    event(StageEventKind::Message, text)
                }
            }
            RuntimeNotification::AgentUpdated { name } => {
                event(StageEventKind::AgentUpdated, name.clone())
            }
            RuntimeNotification::Unknown { kind } => {
                debug!("Ignoring runtime notification {} in stage {}", kind, stage);
                Vec::new()
            }
            RuntimeNotification::RunCompleted(_) => Vec::new(),
        }
    }
}

fn tool_output_text(output: Option<&Value>, status: Option<&str>) -> String {
    match output {
        Some(Value::Null) | None => status.unwrap_or("completed").to_string(),
        Some(Value::String(s)) => truncate_tool_output(s),
        Some(other) => truncate_tool_output(&other.to_string()),
    }
}

/// Cut `text` to [`TOOL_OUTPUT_MAX_CHARS`] characters plus [`ELLIPSIS`]
pub fn truncate_tool_output(text: &str) -> String {
    match text.char_indices().nth(TOOL_OUTPUT_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}
