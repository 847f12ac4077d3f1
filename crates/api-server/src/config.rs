//! Server configuration from environment variables

use std::net::SocketAddr;
use std::time::Duration;

use agent_runner::{DEFAULT_MODEL, DEFAULT_TIMEOUT};
use anyhow::Context;
use lcp_core::location::DEFAULT_GEOLOCATION_URL;
use serde::Serialize;

use crate::session::DEFAULT_SESSION_TTL;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub model: String,
    /// Try the streamed run before falling back to buffered
    pub streaming: bool,
    #[serde(skip)]
    pub request_timeout: Duration,
    pub geolocation_url: String,
    /// Sessions unchanged for this long are dropped
    #[serde(skip)]
    pub session_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
            model: DEFAULT_MODEL.to_string(),
            streaming: true,
            request_timeout: DEFAULT_TIMEOUT,
            geolocation_url: DEFAULT_GEOLOCATION_URL.to_string(),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = env_string("LCP_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("LCP_BIND_ADDR must be a socket address like 0.0.0.0:8081")?;

        let request_timeout = match env_string("LCP_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .context("LCP_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => defaults.request_timeout,
        };

        let session_ttl = match env_string("LCP_SESSION_TTL_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .context("LCP_SESSION_TTL_SECS must be a whole number of seconds")?,
            ),
            None => defaults.session_ttl,
        };

        Ok(Self {
            bind_addr,
            model: env_string("LCP_MODEL").unwrap_or(defaults.model),
            streaming: env_flag("LCP_STREAMING", defaults.streaming),
            request_timeout,
            geolocation_url: env_string("LCP_GEOLOCATION_URL").unwrap_or(defaults.geolocation_url),
            session_ttl,
        })
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_flag(name: &str, default: bool) -> bool {
    parse_flag(std::env::var(name).ok().as_deref(), default)
}

fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert!(parse_flag(Some("YES"), false));
        assert!(parse_flag(Some(" on "), false));
        assert!(!parse_flag(Some("0"), true));
        assert!(!parse_flag(Some("off"), true));
    }

    #[test]
    fn parse_flag_falls_back_to_default() {
        assert!(parse_flag(None, true));
        assert!(!parse_flag(Some("maybe"), false));
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.model, "gpt-5-nano");
        assert!(config.streaming);
        assert_eq!(config.request_timeout, Duration::from_secs(600));
        assert_eq!(config.session_ttl, Duration::from_secs(4 * 60 * 60));
    }
}
