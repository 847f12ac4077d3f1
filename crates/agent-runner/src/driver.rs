//! Workflow driver - runs the stages in order, buffered or streamed
//!
//! The streamed attempt reports through a caller-supplied callback. When it
//! fails, the whole workflow is re-run in buffered mode from the original
//! input; nothing from the failed attempt is carried over.

use std::sync::Arc;

use futures::StreamExt;
use lcp_core::event::{FALLBACK_STAGE, FINAL_STAGE, STREAMING_STAGE};
use lcp_core::{StageEvent, WorkflowInput};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{Result, RunnerError};
use crate::history::ConversationHistory;
use crate::runtime::{AgentRuntime, RunResult, RuntimeNotification};
use crate::stages::{life_care_stages, Stage};
use crate::translator::EventTranslator;

/// Result of the streamed attempt
#[derive(Debug)]
pub enum StreamOutcome {
    Completed(String),
    StreamingFailed(RunnerError),
}

/// How the final output was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Streamed run succeeded
    Streaming,
    /// Streamed run failed, buffered re-run succeeded
    Fallback,
    /// Streaming disabled, buffered run only
    Buffered,
}

/// Final output of a workflow execution
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOutput {
    pub final_output: String,
    pub mode: ExecutionMode,
    /// Why streaming was abandoned, when it was
    pub streaming_error: Option<String>,
}

/// Runs the research stages against an agent runtime
#[derive(Clone)]
pub struct WorkflowDriver {
    runtime: Arc<dyn AgentRuntime>,
    stages: Vec<Stage>,
    translator: EventTranslator,
    streaming_enabled: bool,
}

impl WorkflowDriver {
    pub fn new(runtime: Arc<dyn AgentRuntime>, stages: Vec<Stage>) -> Self {
        Self {
            runtime,
            stages,
            translator: EventTranslator::new(),
            streaming_enabled: true,
        }
    }

    /// Driver for the `planner` → `cost_research` workflow
    pub fn life_care(runtime: Arc<dyn AgentRuntime>, model: &str) -> Self {
        Self::new(runtime, life_care_stages(model))
    }

    /// Enable or disable the streamed attempt in [`execute`](Self::execute)
    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.streaming_enabled = enabled;
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn streaming_enabled(&self) -> bool {
        self.streaming_enabled
    }

    /// Run every stage to completion and return the last stage's text.
    ///
    /// Emits no events; any stage failure is returned as is.
    pub async fn run_workflow(&self, input: &WorkflowInput) -> Result<String> {
        let mut history = ConversationHistory::from_input(input);
        let mut final_output = None;

        for stage in &self.stages {
            info!("Running stage {} (buffered)", stage.name);
            let result = self
                .runtime
                .run(&stage.agent, history.items())
                .await
                .map_err(|e| RunnerError::stage_failed(&stage.name, e))?;
            let added = history.append(result.to_input_items());
            debug!("Stage {} appended {} items", stage.name, added);
            final_output = Some(result.final_output);
        }

        final_output.ok_or(RunnerError::NoStages)
    }

    /// Run every stage through the streaming path, reporting events.
    ///
    /// Ends with a `stage_complete` for the `final` pseudo-stage.
    pub async fn stream_workflow<F>(&self, input: &WorkflowInput, on_event: &mut F) -> Result<String>
    where
        F: FnMut(StageEvent) + Send,
    {
        let mut history = ConversationHistory::from_input(input);
        let mut final_output = None;

        for stage in &self.stages {
            let output = self.stream_stage(stage, &mut history, on_event).await?;
            final_output = Some(output);
        }

        let final_output = final_output.ok_or(RunnerError::NoStages)?;
        on_event(StageEvent::stage_complete(FINAL_STAGE, "Workflow finished"));
        Ok(final_output)
    }

    /// Streamed attempt with the failure captured as a value
    pub async fn try_stream<F>(&self, input: &WorkflowInput, on_event: &mut F) -> StreamOutcome
    where
        F: FnMut(StageEvent) + Send,
    {
        match self.stream_workflow(input, on_event).await {
            Ok(text) => StreamOutcome::Completed(text),
            Err(e) => StreamOutcome::StreamingFailed(e),
        }
    }

    /// Run the workflow, streaming when enabled and falling back to a
    /// buffered re-run once if streaming fails.
    ///
    /// A failure of the fallback itself is returned to the caller.
    pub async fn execute<F>(&self, input: &WorkflowInput, on_event: &mut F) -> Result<WorkflowOutput>
    where
        F: FnMut(StageEvent) + Send,
    {
        if !self.streaming_enabled {
            let final_output = self.run_workflow(input).await?;
            on_event(StageEvent::stage_complete(FINAL_STAGE, "Workflow finished"));
            return Ok(WorkflowOutput {
                final_output,
                mode: ExecutionMode::Buffered,
                streaming_error: None,
            });
        }

        let streaming_error = match self.try_stream(input, on_event).await {
            StreamOutcome::Completed(final_output) => {
                info!("Workflow completed via streaming");
                return Ok(WorkflowOutput {
                    final_output,
                    mode: ExecutionMode::Streaming,
                    streaming_error: None,
                });
            }
            StreamOutcome::StreamingFailed(e) => e,
        };

        warn!("Streaming workflow failed, falling back: {}", streaming_error);
        on_event(StageEvent::stage_error(
            STREAMING_STAGE,
            format!("Streaming failed: {}", streaming_error),
        ));
        on_event(StageEvent::stage_start(
            FALLBACK_STAGE,
            "Falling back to non-streaming workflow.",
        ));

        let final_output = self.run_workflow(input).await.map_err(|e| {
            error!("Fallback workflow failed: {}", e);
            e
        })?;

        on_event(StageEvent::stage_complete(FALLBACK_STAGE, "Fallback run finished."));
        on_event(StageEvent::stage_complete(FINAL_STAGE, "Workflow finished"));

        Ok(WorkflowOutput {
            final_output,
            mode: ExecutionMode::Fallback,
            streaming_error: Some(streaming_error.to_string()),
        })
    }

    async fn stream_stage<F>(
        &self,
        stage: &Stage,
        history: &mut ConversationHistory,
        on_event: &mut F,
    ) -> Result<String>
    where
        F: FnMut(StageEvent) + Send,
    {
        info!("Running stage {} (streaming)", stage.name);
        on_event(StageEvent::stage_start(
            &stage.name,
            format!("{} started", stage.agent.name),
        ));

        let mut stream = self
            .runtime
            .run_streamed(&stage.agent, history.items())
            .await
            .map_err(|e| RunnerError::stage_failed(&stage.name, e))?;

        let mut completed: Option<RunResult> = None;
        while let Some(item) = stream.next().await {
            let notification = item.map_err(|e| RunnerError::stage_failed(&stage.name, e))?;
            for event in self.translator.translate(&stage.name, &notification) {
                on_event(event);
            }
            if let RuntimeNotification::RunCompleted(result) = notification {
                completed = Some(result);
            }
        }

        let result = completed
            .ok_or_else(|| RunnerError::stage_failed(&stage.name, RunnerError::StreamEnded))?;
        let added = history.append(result.to_input_items());
        debug!("Stage {} appended {} items", stage.name, added);

        on_event(StageEvent::stage_complete(
            &stage.name,
            format!("{} finished", stage.agent.name),
        ));
        on_event(StageEvent::stage_output(&stage.name, result.final_output.clone()));
        Ok(result.final_output)
    }
}
