//! Progress tracking for a running workflow
//!
//! Folds the stage event stream into a progress percentage, a one-line
//! status and a per-stage markdown log.

use std::collections::HashMap;

use serde::Serialize;

use crate::event::{
    StageEvent, StageEventKind, COST_RESEARCH_STAGE, FALLBACK_STAGE, FINAL_STAGE, PLANNER_STAGE,
    STREAMING_STAGE,
};
use crate::text::title_case;

/// Stages that count toward the progress bar, in execution order
pub const STAGE_ORDER: [&str; 2] = [PLANNER_STAGE, COST_RESEARCH_STAGE];

const EMPTY_LOG: &str = "_Awaiting agent updates..._";

fn known_display_name(stage: &str) -> Option<&'static str> {
    match stage {
        PLANNER_STAGE => Some("Planning Recommendations"),
        COST_RESEARCH_STAGE => Some("Cost & Sourcing"),
        FALLBACK_STAGE => Some("Fallback Execution"),
        FINAL_STAGE => Some("Finalization"),
        STREAMING_STAGE => Some("Streaming"),
        _ => None,
    }
}

/// Human-readable heading for a stage
pub fn stage_display_name(stage: &str) -> String {
    known_display_name(stage)
        .map(str::to_string)
        .unwrap_or_else(|| title_case(stage))
}

/// Accumulated log for one stage
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageLog {
    pub reasoning: String,
    pub notes: Vec<String>,
    pub output: String,
}

/// Snapshot sent to the browser after each event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub percent: u8,
    pub status: String,
    pub log: String,
}

/// Folds stage events into progress state
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    percent: u8,
    status: String,
    sequence: Vec<String>,
    logs: HashMap<String, StageLog>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            status: "Preparing agent workflow…".to_string(),
            ..Self::default()
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn stage_log(&self, stage: &str) -> Option<&StageLog> {
        self.logs.get(stage)
    }

    /// Apply one event
    pub fn apply(&mut self, event: &StageEvent) {
        if event.stage.is_empty() {
            return;
        }

        let stage = event.stage.as_str();
        if known_display_name(stage).is_some() && !self.sequence.iter().any(|s| s == stage) {
            self.sequence.push(stage.to_string());
        }

        let order_index = STAGE_ORDER.iter().position(|s| *s == stage);
        let entry = self.logs.entry(stage.to_string()).or_default();
        let content = event.content.as_str();

        match event.kind {
            StageEventKind::StageStart => {
                if let Some(idx) = order_index {
                    self.percent = percent_of(idx);
                }
                self.status = format!("**{}** started…", stage_display_name(stage));
            }
            StageEventKind::ReasoningDelta => entry.reasoning.push_str(content),
            StageEventKind::ToolCall => entry.notes.push(format!("Tool call: {}", content)),
            StageEventKind::ToolOutput => entry.notes.push(format!("Tool output: {}", content)),
            StageEventKind::Message => entry.notes.push(content.to_string()),
            StageEventKind::AgentUpdated => {
                entry.notes.push(format!("Switching to agent: {}", content))
            }
            StageEventKind::StageComplete => {
                self.percent = match order_index {
                    Some(idx) => percent_of(idx + 1),
                    None => 100,
                };
                self.status = format!("**{}** complete.", stage_display_name(stage));
            }
            StageEventKind::StageOutput => entry.output = content.to_string(),
            StageEventKind::StageError => {
                entry.notes.push(format!("⚠️ {}", content));
                self.status = content.to_string();
            }
            // Output deltas duplicate the final message; the log skips them
            StageEventKind::OutputDelta => {}
        }
    }

    /// Mark the whole run as finished
    pub fn complete(&mut self) {
        self.percent = 100;
        self.status = "✅ Workflow complete.".to_string();
    }

    /// Mark the whole run as failed
    pub fn fail(&mut self) {
        self.status = "Research workflow failed.".to_string();
    }

    /// Render the per-stage markdown log
    pub fn render_log(&self) -> String {
        let mut sections = Vec::new();

        for stage in &self.sequence {
            let Some(log) = self.logs.get(stage) else {
                continue;
            };

            let mut lines = Vec::new();
            let reasoning = log.reasoning.trim();
            if !reasoning.is_empty() {
                lines.push(format!("> {}", reasoning.replace('\n', "\n> ")));
            }
            for note in &log.notes {
                let note = note.trim();
                if !note.is_empty() {
                    lines.push(format!("- {}", note));
                }
            }
            if lines.is_empty() {
                lines.push("_No updates yet_".to_string());
            }

            sections.push(format!(
                "**{}**\n{}",
                stage_display_name(stage),
                lines.join("\n")
            ));
        }

        if sections.is_empty() {
            return EMPTY_LOG.to_string();
        }
        sections.join("\n\n")
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            percent: self.percent,
            status: self.status.clone(),
            log: self.render_log(),
        }
    }
}

fn percent_of(done: usize) -> u8 {
    let total = STAGE_ORDER.len().max(1);
    ((done.min(total) * 100) / total) as u8
}
