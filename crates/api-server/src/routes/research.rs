//! Research endpoints
//!
//! Both endpoints run the same workflow with fallback. The plain endpoint
//! answers once the run is over; the stream endpoint forwards each stage
//! event with a progress snapshot as server-sent events.

use std::convert::Infallible;

use agent_runner::{ExecutionMode, WorkflowOutput};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use futures::{Stream, StreamExt};
use lcp_core::{ProgressSnapshot, ProgressTracker, ResearchRequest, StageEvent, WorkflowInput};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, info};
use uuid::Uuid;

use super::{core_error, error_response, load_session, ApiError};
use crate::session::ResearchSession;
use crate::state::AppState;

pub const REPORT_FILENAME: &str = "medical_research_results.txt";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchBody {
    #[serde(default)]
    pub patient_summary: String,
    /// Overrides the session's location field when present
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchOutcome {
    pub mode: ExecutionMode,
    pub final_output: String,
    pub streaming_error: Option<String>,
    pub progress: ProgressSnapshot,
    pub session: Option<ResearchSession>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResponse {
    #[serde(flatten)]
    pub outcome: ResearchOutcome,
    pub events: Vec<StageEvent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchFailure {
    pub error: String,
    pub progress: ProgressSnapshot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StageUpdate {
    event: StageEvent,
    progress: ProgressSnapshot,
}

/// Messages on the research event stream
#[derive(Debug)]
enum StreamMessage {
    Stage(StageUpdate),
    Result(Box<ResearchOutcome>),
    Failed(ResearchFailure),
}

impl StreamMessage {
    fn into_event(self) -> Event {
        let built = match &self {
            Self::Stage(update) => Event::default().event("stage").json_data(update),
            Self::Result(outcome) => Event::default().event("result").json_data(outcome),
            Self::Failed(failure) => Event::default().event("failed").json_data(failure),
        };
        built.unwrap_or_else(|e| {
            error!("Failed to encode research event: {}", e);
            Event::default().event("failed").data(e.to_string())
        })
    }
}

/// Validate the body against the session and build the workflow input
async fn prepare(state: &AppState, id: Uuid, body: ResearchBody) -> Result<WorkflowInput, ApiError> {
    let session = load_session(state, id).await?;
    let location = match body.location {
        Some(location) => {
            state
                .sessions()
                .update(id, |s| s.set_location(location.clone()))
                .await;
            location
        }
        None => session.location_input,
    };

    ResearchRequest::new(body.patient_summary)
        .with_location(location)
        .to_workflow_input()
        .map_err(core_error)
}

/// Record the run on the session and shape the reply
async fn finish(
    state: &AppState,
    id: Uuid,
    result: agent_runner::Result<WorkflowOutput>,
    tracker: &mut ProgressTracker,
) -> Result<ResearchOutcome, ResearchFailure> {
    match result {
        Ok(output) => {
            tracker.complete();
            info!("Session {} research finished via {:?}", id, output.mode);
            let session = state
                .sessions()
                .update(id, |s| {
                    s.record_result(&output.final_output);
                    s.clone()
                })
                .await;
            Ok(ResearchOutcome {
                mode: output.mode,
                final_output: output.final_output,
                streaming_error: output.streaming_error,
                progress: tracker.snapshot(),
                session,
            })
        }
        Err(e) => {
            tracker.fail();
            error!("Session {} research failed: {}", id, e);
            let message = e.to_string();
            state
                .sessions()
                .update(id, |s| s.record_failure(&message))
                .await;
            Err(ResearchFailure {
                error: format!("Research failed: {}", message),
                progress: tracker.snapshot(),
            })
        }
    }
}

/// POST /api/sessions/{id}/research - Run and wait for the result
async fn run_research(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResearchBody>,
) -> Result<Json<ResearchResponse>, ApiError> {
    let input = prepare(&state, id, body).await?;

    let mut tracker = ProgressTracker::new();
    let mut events = Vec::new();
    let result = {
        let mut on_event = |event: StageEvent| {
            tracker.apply(&event);
            events.push(event);
        };
        state.driver().execute(&input, &mut on_event).await
    };

    match finish(&state, id, result, &mut tracker).await {
        Ok(outcome) => Ok(Json(ResearchResponse { outcome, events })),
        Err(failure) => Err(error_response(StatusCode::BAD_GATEWAY, failure.error)),
    }
}

/// POST /api/sessions/{id}/research/stream - Run with live progress
async fn stream_research(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResearchBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let input = prepare(&state, id, body).await?;
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut tracker = ProgressTracker::new();
        let result = {
            let mut on_event = |event: StageEvent| {
                tracker.apply(&event);
                let progress = tracker.snapshot();
                // Client may have gone away; the run still finishes
                let _ = tx.send(StreamMessage::Stage(StageUpdate { event, progress }));
            };
            state.driver().execute(&input, &mut on_event).await
        };

        let message = match finish(&state, id, result, &mut tracker).await {
            Ok(outcome) => StreamMessage::Result(Box::new(outcome)),
            Err(failure) => StreamMessage::Failed(failure),
        };
        let _ = tx.send(message);
    });

    let stream = UnboundedReceiverStream::new(rx).map(|message| Ok::<_, Infallible>(message.into_event()));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /api/sessions/{id}/report - Raw result as a text download
async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = load_session(&state, id)
        .await?
        .raw_response
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "No research results yet"))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", REPORT_FILENAME),
            ),
        ],
        raw,
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sessions/{id}/research", post(run_research))
        .route("/api/sessions/{id}/research/stream", post(stream_research))
        .route("/api/sessions/{id}/report", get(download_report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{
        body_json, body_text, create_session, empty_request, json_request, scripted, state,
        state_with, PLAN, RESULT,
    };
    use agent_runner::{COST_RESEARCH_AGENT, PLANNER_AGENT};
    use serde_json::json;
    use tower::ServiceExt;

    const SUMMARY: &str = "42-year-old with C5 spinal cord injury, spasticity, full-time wheelchair user";

    fn research_uri(id: Uuid) -> String {
        format!("/api/sessions/{}/research", id)
    }

    #[tokio::test]
    async fn research_returns_result_events_and_reviews() {
        let state = state();
        let id = create_session(&state).await;

        let response = router()
            .with_state(state.clone())
            .oneshot(json_request("POST", &research_uri(id), json!({"patientSummary": SUMMARY})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["mode"], "streaming");
        assert_eq!(body["finalOutput"], RESULT);
        assert_eq!(body["progress"]["percent"], 100);

        let events = body["events"].as_array().unwrap();
        assert_eq!(events[0]["stage"], "planner");
        assert_eq!(events[0]["type"], "stage_start");
        let last = events.last().unwrap();
        assert_eq!(last["stage"], "final");
        assert_eq!(last["type"], "stage_complete");
        assert!(events
            .iter()
            .any(|e| e["type"] == "stage_output" && e["content"] == PLAN));

        let session = state.sessions().get(id).await.unwrap();
        let categories = session.reviews.categories();
        assert_eq!(categories[0].key, "medications");
        assert_eq!(categories[1].label, "Durable Medical Equipment");
        assert_eq!(categories[1].rows[0].cost, 24500.0);
    }

    #[tokio::test]
    async fn research_prompt_includes_session_location() {
        let runtime = scripted();
        let state = state_with(runtime.clone(), "http://127.0.0.1:9/json/");
        let id = create_session(&state).await;
        state.sessions().update(id, |s| s.set_location("Austin, TX")).await;

        router()
            .with_state(state)
            .oneshot(json_request("POST", &research_uri(id), json!({"patientSummary": SUMMARY})))
            .await
            .unwrap();

        let prompt = &runtime.calls()[0].input[0].content;
        assert!(prompt.contains(SUMMARY));
        assert!(prompt.contains("The patient's location is: Austin, TX."));
    }

    #[tokio::test]
    async fn blank_summary_rejected() {
        let state = state();
        let id = create_session(&state).await;

        let response = router()
            .with_state(state)
            .oneshot(json_request("POST", &research_uri(id), json!({"patientSummary": "   "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("Please enter the patient's medical summary"));
    }

    #[tokio::test]
    async fn streaming_failure_falls_back() {
        let state = state_with(scripted().fail_streamed(COST_RESEARCH_AGENT), "http://127.0.0.1:9/json/");
        let id = create_session(&state).await;

        let response = router()
            .with_state(state)
            .oneshot(json_request("POST", &research_uri(id), json!({"patientSummary": SUMMARY})))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["mode"], "fallback");
        assert_eq!(body["finalOutput"], RESULT);
        assert!(body["streamingError"].as_str().unwrap().contains("cost_research"));
        let events = body["events"].as_array().unwrap();
        assert!(events
            .iter()
            .any(|e| e["stage"] == "streaming" && e["type"] == "stage_error"));
        assert!(events
            .iter()
            .any(|e| e["stage"] == "fallback" && e["type"] == "stage_complete"));
    }

    #[tokio::test]
    async fn fallback_failure_reported_and_recorded() {
        let runtime = scripted()
            .fail_streamed(PLANNER_AGENT)
            .fail_buffered(PLANNER_AGENT);
        let state = state_with(runtime, "http://127.0.0.1:9/json/");
        let id = create_session(&state).await;

        let response = router()
            .with_state(state.clone())
            .oneshot(json_request("POST", &research_uri(id), json!({"patientSummary": SUMMARY})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Research failed: "));

        let session = state.sessions().get(id).await.unwrap();
        assert!(session.research_data.is_none());
        assert!(session.last_error.is_some());
    }

    #[tokio::test]
    async fn stream_emits_stage_events_then_result() {
        let state = state();
        let id = create_session(&state).await;

        let response = router()
            .with_state(state)
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{}/research/stream", id),
                json!({"patientSummary": SUMMARY, "location": "78701"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
        let body = body_text(response).await;
        let first_stage = body.find("event: stage").unwrap();
        let result = body.find("event: result").unwrap();
        assert!(first_stage < result);
        assert!(body.contains("\"stage\":\"cost_research\""));
        assert!(body.contains("Planning Recommendations"));
        assert!(!body.contains("event: failed"));
    }

    #[tokio::test]
    async fn stream_reports_failure() {
        let runtime = scripted()
            .fail_streamed(PLANNER_AGENT)
            .fail_buffered(COST_RESEARCH_AGENT);
        let state = state_with(runtime, "http://127.0.0.1:9/json/");
        let id = create_session(&state).await;

        let response = router()
            .with_state(state)
            .oneshot(json_request(
                "POST",
                &format!("/api/sessions/{}/research/stream", id),
                json!({"patientSummary": SUMMARY}),
            ))
            .await
            .unwrap();

        let body = body_text(response).await;
        assert!(body.contains("event: failed"));
        assert!(body.contains("Research workflow failed."));
        assert!(!body.contains("event: result"));
    }

    #[tokio::test]
    async fn report_downloads_raw_result() {
        let state = state();
        let id = create_session(&state).await;
        let app = router().with_state(state);

        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/api/sessions/{}/report", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        app.clone()
            .oneshot(json_request("POST", &research_uri(id), json!({"patientSummary": SUMMARY})))
            .await
            .unwrap();

        let response = app
            .oneshot(empty_request("GET", &format!("/api/sessions/{}/report", id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"medical_research_results.txt\""
        );
        assert_eq!(body_text(response).await, RESULT);
    }
}
