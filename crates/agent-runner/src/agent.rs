//! Hosted agent configuration

use serde::{Deserialize, Serialize};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gpt-5-nano";

/// Hosted tools an agent may call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentTool {
    WebSearch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub parallel_tool_calls: bool,
    /// Ask reasoning models for a reasoning summary (streamed as deltas)
    pub reasoning_summary: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            parallel_tool_calls: true,
            reasoning_summary: true,
        }
    }
}

/// An agent as the hosted runtime sees it: name, prompt, model, tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub tools: Vec<AgentTool>,
    pub model_settings: ModelSettings,
}

impl Agent {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            model: DEFAULT_MODEL.to_string(),
            tools: Vec::new(),
            model_settings: ModelSettings::default(),
        }
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Add a hosted tool
    pub fn with_tool(mut self, tool: AgentTool) -> Self {
        if !self.tools.contains(&tool) {
            self.tools.push(tool);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_defaults() {
        let agent = Agent::new("LifeCareAgent", "research costs");
        assert_eq!(agent.model, DEFAULT_MODEL);
        assert!(agent.tools.is_empty());
        assert!(agent.model_settings.parallel_tool_calls);
        assert!(agent.model_settings.reasoning_summary);
    }

    #[test]
    fn test_with_tool_deduplicates() {
        let agent = Agent::new("a", "b")
            .with_tool(AgentTool::WebSearch)
            .with_tool(AgentTool::WebSearch);
        assert_eq!(agent.tools, vec![AgentTool::WebSearch]);
    }
}
