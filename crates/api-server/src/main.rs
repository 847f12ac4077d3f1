//! API Server for the Life Care Research Assistant
//!
//! Serves the research form, runs the planner and cost research workflow
//! against the hosted agent runtime and streams progress to the browser.

mod config;
mod routes;
mod session;
mod state;

use std::time::Duration;

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api_server=debug,agent_runner=info,lcp_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        "Model {} (streaming {})",
        config.model,
        if config.streaming { "on" } else { "off" }
    );

    let bind_addr = config.bind_addr;
    let sweep_every = (config.session_ttl / 4).max(Duration::from_secs(60));
    let app_state = AppState::from_config(config).context("Failed to initialize application state")?;

    // Background sweep of idle sessions
    let sweep_state = app_state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            let evicted = sweep_state.sessions().prune_expired().await;
            if evicted > 0 {
                tracing::info!("Session sweep removed {} idle sessions", evicted);
            }
        }
    });

    let app = routes::app(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("REST API listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
