//! Doctor review endpoints

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use lcp_core::research::{CategoryReview, ReviewRow, ReviewSummary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{core_error, load_session, session_not_found, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub key: String,
    pub label: String,
    pub rows: Vec<ReviewRow>,
    pub summary: ReviewSummary,
}

impl From<&CategoryReview> for CategoryResponse {
    fn from(category: &CategoryReview) -> Self {
        Self {
            key: category.key.clone(),
            label: category.label.clone(),
            rows: category.rows.clone(),
            summary: category.summary(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub categories: Vec<CategoryResponse>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rows: Vec<ReviewRow>,
}

/// GET /api/sessions/{id}/reviews - Review tables for every category
async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    let session = load_session(&state, id).await?;
    Ok(Json(ReviewsResponse {
        categories: session
            .reviews
            .categories()
            .iter()
            .map(CategoryResponse::from)
            .collect(),
    }))
}

/// PUT /api/sessions/{id}/reviews/{category} - Save an edited table
async fn update_review(
    State(state): State<AppState>,
    Path((id, category)): Path<(Uuid, String)>,
    Json(req): Json<UpdateReviewRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let updated = state
        .sessions()
        .update(id, |session| {
            session
                .reviews
                .replace_rows(&category, req.rows)
                .map(CategoryResponse::from)
        })
        .await
        .ok_or_else(|| session_not_found(id))?
        .map_err(core_error)?;

    tracing::debug!(
        "Session {} review {} saved: {} approved, {} rejected, {} pending",
        id,
        updated.key,
        updated.summary.approved,
        updated.summary.rejected,
        updated.summary.pending
    );
    Ok(Json(updated))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sessions/{id}/reviews", get(list_reviews))
        .route("/api/sessions/{id}/reviews/{category}", put(update_review))
}
