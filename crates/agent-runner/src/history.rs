//! Conversation history threaded between workflow stages

use lcp_core::WorkflowInput;
use serde::{Deserialize, Serialize};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// One turn exchanged with the agent runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationItem {
    pub role: MessageRole,
    pub content: String,
}

impl ConversationItem {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Append-only record of the turns of one workflow invocation.
///
/// Owned by a single invocation and mutated only between stages.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    items: Vec<ConversationItem>,
}

impl ConversationHistory {
    /// Start a history from the workflow's user prompt
    pub fn from_input(input: &WorkflowInput) -> Self {
        Self {
            items: vec![ConversationItem::user(input.as_text())],
        }
    }

    pub fn items(&self) -> &[ConversationItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append items produced by a stage, returns how many were added
    pub fn append(&mut self, items: impl IntoIterator<Item = ConversationItem>) -> usize {
        let before = self.items.len();
        self.items.extend(items);
        self.items.len() - before
    }
}
