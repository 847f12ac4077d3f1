//! Application state

use std::sync::Arc;

use agent_runner::{ClientConfig, OpenAiClient, WorkflowDriver};
use lcp_core::location::{LocationClient, DEFAULT_LOOKUP_TIMEOUT};

use crate::config::ServerConfig;
use crate::session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    driver: WorkflowDriver,
    sessions: SessionStore,
    location: LocationClient,
}

impl AppState {
    /// Build state backed by the hosted OpenAI runtime
    pub fn from_config(config: ServerConfig) -> anyhow::Result<Self> {
        let client_config = ClientConfig::from_env()?.with_timeout(config.request_timeout);
        let runtime = Arc::new(OpenAiClient::new(client_config)?);
        let driver = WorkflowDriver::life_care(runtime, &config.model);
        let location = LocationClient::new(config.geolocation_url.clone(), DEFAULT_LOOKUP_TIMEOUT);

        Ok(Self::with_driver(config, driver, location))
    }

    /// Build state around an existing driver
    pub fn with_driver(config: ServerConfig, driver: WorkflowDriver, location: LocationClient) -> Self {
        let driver = driver.with_streaming(config.streaming);
        let sessions = SessionStore::new(config.session_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                driver,
                sessions,
                location,
            }),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub fn driver(&self) -> &WorkflowDriver {
        &self.inner.driver
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    pub fn location(&self) -> &LocationClient {
        &self.inner.location
    }
}
