//! Scripted agent runtime for tests
//!
//! Replies are keyed by agent name. Every call is recorded so tests can
//! inspect ordering and the conversation each stage saw.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;

use crate::agent::Agent;
use crate::error::{Result, RunnerError};
use crate::history::ConversationItem;
use crate::runtime::{AgentRuntime, NotificationStream, RunResult, RuntimeNotification};

/// One recorded runtime call
#[derive(Debug, Clone)]
pub struct RuntimeCall {
    pub agent: String,
    pub streamed: bool,
    pub input: Vec<ConversationItem>,
}

#[derive(Debug, Clone, Default)]
struct Script {
    notifications: Option<Vec<RuntimeNotification>>,
    final_output: String,
    fail_streamed: bool,
    reject_streamed: bool,
    fail_buffered: bool,
    truncate_stream: bool,
}

/// In-memory [`AgentRuntime`] that replays canned replies
#[derive(Debug, Clone, Default)]
pub struct ScriptedRuntime {
    scripts: HashMap<String, Script>,
    calls: Arc<Mutex<Vec<RuntimeCall>>>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `agent` with `final_output`, streaming a default set of
    /// notifications
    pub fn reply(mut self, agent: &str, final_output: impl Into<String>) -> Self {
        self.script(agent).final_output = final_output.into();
        self
    }

    /// Reply to `agent` with explicit notifications before completion
    pub fn reply_with(
        mut self,
        agent: &str,
        notifications: Vec<RuntimeNotification>,
        final_output: impl Into<String>,
    ) -> Self {
        let script = self.script(agent);
        script.notifications = Some(notifications);
        script.final_output = final_output.into();
        self
    }

    /// Fail the streamed run of `agent` after its first notification
    pub fn fail_streamed(mut self, agent: &str) -> Self {
        self.script(agent).fail_streamed = true;
        self
    }

    /// Refuse to open a stream for `agent`, as on an HTTP error status
    pub fn reject_streamed(mut self, agent: &str) -> Self {
        self.script(agent).reject_streamed = true;
        self
    }

    /// Fail the buffered run of `agent`
    pub fn fail_buffered(mut self, agent: &str) -> Self {
        self.script(agent).fail_buffered = true;
        self
    }

    /// Close the stream of `agent` without a completed run
    pub fn truncate_stream(mut self, agent: &str) -> Self {
        self.script(agent).truncate_stream = true;
        self
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn script(&mut self, agent: &str) -> &mut Script {
        self.scripts.entry(agent.to_string()).or_default()
    }

    fn record(&self, agent: &Agent, streamed: bool, input: &[ConversationItem]) -> Result<Script> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RuntimeCall {
                agent: agent.name.clone(),
                streamed,
                input: input.to_vec(),
            });
        }
        self.scripts
            .get(&agent.name)
            .cloned()
            .ok_or_else(|| RunnerError::api(404, format!("no script for agent {}", agent.name)))
    }
}

fn run_result(final_output: &str) -> RunResult {
    RunResult::new(final_output, vec![ConversationItem::assistant(final_output)])
}

fn default_notifications(agent: &Agent, final_output: &str) -> Vec<RuntimeNotification> {
    vec![
        RuntimeNotification::AgentUpdated {
            name: agent.name.clone(),
        },
        RuntimeNotification::ReasoningDelta {
            delta: format!("{} is thinking", agent.name),
        },
        RuntimeNotification::OutputDelta {
            delta: final_output.to_string(),
        },
        RuntimeNotification::MessageCompleted {
            segments: vec![final_output.to_string()],
        },
    ]
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    async fn run(&self, agent: &Agent, input: &[ConversationItem]) -> Result<RunResult> {
        let script = self.record(agent, false, input)?;
        if script.fail_buffered {
            return Err(RunnerError::api(500, format!("{} unavailable", agent.name)));
        }
        Ok(run_result(&script.final_output))
    }

    async fn run_streamed(
        &self,
        agent: &Agent,
        input: &[ConversationItem],
    ) -> Result<NotificationStream> {
        let script = self.record(agent, true, input)?;
        if script.reject_streamed {
            return Err(RunnerError::api(401, "invalid api key"));
        }
        let notifications = script
            .notifications
            .clone()
            .unwrap_or_else(|| default_notifications(agent, &script.final_output));

        let mut items: Vec<Result<RuntimeNotification>> = Vec::new();
        if script.fail_streamed {
            items.extend(notifications.into_iter().take(1).map(Ok));
            items.push(Err(RunnerError::stream("connection reset")));
        } else {
            items.extend(notifications.into_iter().map(Ok));
            if !script.truncate_stream {
                items.push(Ok(RuntimeNotification::RunCompleted(run_result(
                    &script.final_output,
                ))));
            }
        }

        Ok(futures::stream::iter(items).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    #[tokio::test]
    async fn test_streamed_reply_ends_with_completion() {
        let runtime = ScriptedRuntime::new().reply("Planner", "plan");
        let agent = Agent::new("Planner", "plan things");
        let notifications: Vec<_> = runtime
            .run_streamed(&agent, &[ConversationItem::user("hi")])
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(
            notifications.last(),
            Some(&RuntimeNotification::RunCompleted(run_result("plan")))
        );
        assert_eq!(runtime.calls()[0].input.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_agent_errors() {
        let runtime = ScriptedRuntime::new();
        let agent = Agent::new("Nobody", "");
        assert!(runtime.run(&agent, &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_rejected_stream_errors_before_any_notification() {
        let runtime = ScriptedRuntime::new().reply("Planner", "plan").reject_streamed("Planner");
        let agent = Agent::new("Planner", "plan things");

        assert!(runtime.run_streamed(&agent, &[]).await.is_err());
        assert_eq!(runtime.run(&agent, &[]).await.unwrap().final_output, "plan");
        assert!(runtime.calls()[0].streamed);
    }
}
