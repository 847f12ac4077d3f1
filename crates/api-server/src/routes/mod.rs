//! Route handlers

pub mod health;
pub mod index;
pub mod location;
pub mod research;
pub mod reviews;
pub mod sessions;

use axum::{http::StatusCode, Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::session::ResearchSession;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Map a domain error to an HTTP status
pub fn core_error(err: lcp_core::Error) -> ApiError {
    let status = match &err {
        lcp_core::Error::NotFound(_) => StatusCode::NOT_FOUND,
        lcp_core::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
    };
    error_response(status, err.to_string())
}

pub fn session_not_found(id: Uuid) -> ApiError {
    error_response(StatusCode::NOT_FOUND, format!("Session {} not found", id))
}

pub async fn load_session(state: &AppState, id: Uuid) -> Result<ResearchSession, ApiError> {
    state
        .sessions()
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))
}

/// All routes, state applied
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(index::router())
        .merge(health::router())
        .merge(sessions::router())
        .merge(location::router())
        .merge(research::router())
        .merge(reviews::router())
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_client_statuses() {
        let (status, Json(body)) = core_error(lcp_core::Error::NotFound("Review category x".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Not found: Review category x");

        let (status, _) = core_error(lcp_core::Error::InvalidInput("negative cost".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
