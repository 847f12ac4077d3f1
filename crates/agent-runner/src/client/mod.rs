//! OpenAI Responses API client implementing [`AgentRuntime`]

mod sse;
mod wire;

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::error::{Result, RunnerError};
use crate::history::ConversationItem;
use crate::runtime::{AgentRuntime, NotificationStream, RunResult, RuntimeNotification};

pub use sse::SseDecoder;
pub use wire::{ResponseObject, ResponsesRequest, StreamPayload};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default ceiling for a whole run, tool calls included
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `OPENAI_API_KEY` and optional `OPENAI_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(RunnerError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            if !base_url.trim().is_empty() {
                config = config.with_base_url(base_url);
            }
        }
        Ok(config)
    }
}

/// Agent runtime backed by the hosted Responses API
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    config: ClientConfig,
}

impl OpenAiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, agent: &Agent, input: &[ConversationItem], stream: bool) -> Result<reqwest::Response> {
        let url = format!("{}/responses", self.config.base_url);
        let request = ResponsesRequest::new(agent, input, stream);
        debug!("POST {} agent={} items={} stream={}", url, agent.name, input.len(), stream);

        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(RunnerError::api(status.as_u16(), body));
        }
        Ok(res)
    }
}

#[async_trait]
impl AgentRuntime for OpenAiClient {
    async fn run(&self, agent: &Agent, input: &[ConversationItem]) -> Result<RunResult> {
        info!("Running agent {} (buffered)", agent.name);
        let response: ResponseObject = self.send(agent, input, false).await?.json().await?;
        response.into_run_result()
    }

    async fn run_streamed(
        &self,
        agent: &Agent,
        input: &[ConversationItem],
    ) -> Result<NotificationStream> {
        info!("Running agent {} (streaming)", agent.name);
        let res = self.send(agent, input, true).await?;
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let agent_name = agent.name.clone();

        tokio::spawn(async move {
            if tx
                .send(Ok(RuntimeNotification::AgentUpdated { name: agent_name }))
                .await
                .is_err()
            {
                return;
            }

            let mut body = res.bytes_stream();
            let mut decoder = SseDecoder::new();

            while let Some(chunk) = body.next().await {
                let payloads = match chunk {
                    Ok(bytes) => decoder.push(&bytes),
                    Err(e) => {
                        warn!("Agent stream read failed: {}", e);
                        let _ = tx.send(Err(RunnerError::from(e))).await;
                        return;
                    }
                };
                for payload in payloads {
                    if tx.send(decode_payload(&payload)).await.is_err() {
                        // Receiver closed
                        return;
                    }
                }
            }

            if let Some(payload) = decoder.finish() {
                let _ = tx.send(decode_payload(&payload)).await;
            }
        });

        Ok(ReceiverStream::new(rx).boxed())
    }
}

fn decode_payload(payload: &str) -> Result<RuntimeNotification> {
    serde_json::from_str::<StreamPayload>(payload)?.into_notification()
}
