//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    version: String,
    model: String,
    streaming: bool,
    sessions: usize,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.config().model.clone(),
        streaming: state.driver().streaming_enabled(),
        sessions: state.sessions().len().await,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{body_json, empty_request, state};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_reports_model_and_streaming() {
        let response = router()
            .with_state(state())
            .oneshot(empty_request("GET", "/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "gpt-5-nano");
        assert_eq!(body["streaming"], true);
        assert_eq!(body["sessions"], 0);
    }
}
