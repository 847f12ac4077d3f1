//! Session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::{load_session, session_not_found, ApiError};
use crate::session::ResearchSession;
use crate::state::AppState;

/// POST /api/sessions - Start a new session
async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<ResearchSession>) {
    let session = state.sessions().create().await;
    tracing::info!("Created session {}", session.id);
    (StatusCode::CREATED, Json(session))
}

/// GET /api/sessions/{id} - Current session view
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResearchSession>, ApiError> {
    Ok(Json(load_session(&state, id).await?))
}

/// DELETE /api/sessions/{id} - Discard a session and its results
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions()
        .remove(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    tracing::info!("Deleted session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
}
