//! Patient location endpoints

use axum::{
    extract::{Path, State},
    routing::{post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::{load_session, session_not_found, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetLocationRequest {
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
    pub location: String,
    /// Set on auto-detect: whether a location was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// PUT /api/sessions/{id}/location - Set the location field
async fn set_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetLocationRequest>,
) -> Result<Json<LocationResponse>, ApiError> {
    let location = state
        .sessions()
        .update(id, |session| {
            session.set_location(req.location);
            session.location_input.clone()
        })
        .await
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(LocationResponse {
        location,
        detected: None,
        message: None,
    }))
}

/// POST /api/sessions/{id}/location/detect - Fill the location from IP
///
/// Detection problems are reported in the body, never as an HTTP error.
async fn detect_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LocationResponse>, ApiError> {
    load_session(&state, id).await?;

    let (detected, message) = match state.location().detect().await {
        Ok(Some(found)) => {
            let message = format!("Detected location: {}", found);
            state
                .sessions()
                .update(id, |session| session.set_location(found))
                .await
                .ok_or_else(|| session_not_found(id))?;
            (true, message)
        }
        Ok(None) => (
            false,
            "Could not detect a precise location. Please enter it manually.".to_string(),
        ),
        Err(e) => {
            warn!("Location detection failed: {}", e);
            (
                false,
                "Location detection failed. Please enter your location manually.".to_string(),
            )
        }
    };

    let location = load_session(&state, id).await?.location_input;

    Ok(Json(LocationResponse {
        location,
        detected: Some(detected),
        message: Some(message),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sessions/{id}/location", put(set_location))
        .route("/api/sessions/{id}/location/detect", post(detect_location))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{
        body_json, create_session, empty_request, json_request, scripted, state, state_with,
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    async fn geo_server(body: serde_json::Value) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route(
            "/json/",
            axum::routing::get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/json/", addr)
    }

    #[tokio::test]
    async fn set_location_trims() {
        let state = state();
        let id = create_session(&state).await;

        let response = router()
            .with_state(state.clone())
            .oneshot(json_request(
                "PUT",
                &format!("/api/sessions/{}/location", id),
                json!({"location": "  78701 "}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["location"], "78701");
        assert_eq!(state.sessions().get(id).await.unwrap().location_input, "78701");
    }

    #[tokio::test]
    async fn detect_fills_session_location() {
        let url = geo_server(json!({"city": "Austin", "region": "Texas", "postal": "78701"})).await;
        let state = state_with(scripted(), &url);
        let id = create_session(&state).await;

        let response = router()
            .with_state(state.clone())
            .oneshot(empty_request("POST", &format!("/api/sessions/{}/location/detect", id)))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["detected"], true);
        assert_eq!(body["location"], "Austin, Texas");
        assert_eq!(body["message"], "Detected location: Austin, Texas");
        assert_eq!(state.sessions().get(id).await.unwrap().location_input, "Austin, Texas");
    }

    #[tokio::test]
    async fn detect_without_usable_fields_keeps_input() {
        let url = geo_server(json!({"ip": "10.0.0.1"})).await;
        let state = state_with(scripted(), &url);
        let id = create_session(&state).await;
        state
            .sessions()
            .update(id, |s| s.set_location("Denver, CO"))
            .await;

        let response = router()
            .with_state(state)
            .oneshot(empty_request("POST", &format!("/api/sessions/{}/location/detect", id)))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["detected"], false);
        assert_eq!(body["location"], "Denver, CO");
        assert!(body["message"].as_str().unwrap().starts_with("Could not detect"));
    }

    #[tokio::test]
    async fn detect_failure_is_not_an_http_error() {
        // Nothing listens on the discard port
        let state = state();
        let id = create_session(&state).await;

        let response = router()
            .with_state(state)
            .oneshot(empty_request("POST", &format!("/api/sessions/{}/location/detect", id)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["detected"], false);
        assert!(body["message"].as_str().unwrap().starts_with("Location detection failed"));
    }
}
