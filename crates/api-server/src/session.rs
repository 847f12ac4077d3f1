//! Per-browser research sessions
//!
//! Each session carries the UI context between requests: the location
//! field, the last agent response and the doctor's review edits. Sessions
//! live in memory only and expire after a period without changes.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lcp_core::research::{parse_research_result, ResearchData, ReviewBoard};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const RESEARCH_COMPLETED: &str = "✅ Research completed!";
pub const NON_JSON_OUTPUT: &str = "Agent returned non-JSON output. Showing raw text.";
pub const WORKFLOW_FAILED: &str = "Research workflow failed.";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchSession {
    pub id: Uuid,
    pub location_input: String,
    /// Last final output, verbatim
    pub raw_response: Option<String>,
    /// Parsed categories when the output was a JSON object
    pub research_data: Option<ResearchData>,
    pub reviews: ReviewBoard,
    pub status_message: Option<String>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResearchSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            location_input: String::new(),
            raw_response: None,
            research_data: None,
            reviews: ReviewBoard::new(),
            status_message: None,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location_input = location.into().trim().to_string();
        self.touch();
    }

    /// Store a finished run. Previous review edits are discarded; the result
    /// is shown raw when it does not parse.
    pub fn record_result(&mut self, final_output: &str) {
        self.raw_response = Some(final_output.to_string());
        self.reviews.clear();
        self.last_error = None;

        match parse_research_result(final_output) {
            Ok(data) => {
                info!(
                    "Session {} parsed {} items in {} categories",
                    self.id,
                    data.item_count(),
                    data.categories.len()
                );
                self.reviews.seed(&data);
                self.research_data = Some(data);
                self.status_message = Some(RESEARCH_COMPLETED.to_string());
            }
            Err(e) => {
                warn!("Session {} result is not structured: {}", self.id, e);
                self.research_data = None;
                self.status_message = Some(NON_JSON_OUTPUT.to_string());
            }
        }
        self.touch();
    }

    /// Store a failed run
    pub fn record_failure(&mut self, error: &str) {
        self.research_data = None;
        self.reviews.clear();
        self.status_message = Some(WORKFLOW_FAILED.to_string());
        self.last_error = Some(format!("Research failed: {}", error));
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for ResearchSession {
    fn default() -> Self {
        Self::new()
    }
}

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(4 * 60 * 60);

/// In-memory session map with idle expiry
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, ResearchSession>>,
    ttl: chrono::Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Create a session, dropping any that have gone idle
    pub async fn create(&self) -> ResearchSession {
        let session = ResearchSession::new();
        let mut sessions = self.sessions.write().await;
        Self::evict_idle(&mut sessions, self.cutoff());
        sessions.insert(session.id, session.clone());
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<ResearchSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Mutate a session in place, `None` if it does not exist
    pub async fn update<T>(&self, id: Uuid, f: impl FnOnce(&mut ResearchSession) -> T) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&id).map(f)
    }

    pub async fn remove(&self, id: Uuid) -> Option<ResearchSession> {
        self.sessions.write().await.remove(&id)
    }

    /// Drop sessions not changed within the TTL, returning how many went
    pub async fn prune_expired(&self) -> usize {
        let cutoff = self.cutoff();
        Self::evict_idle(&mut *self.sessions.write().await, cutoff)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn cutoff(&self) -> DateTime<Utc> {
        Utc::now()
            .checked_sub_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn evict_idle(sessions: &mut HashMap<Uuid, ResearchSession>, cutoff: DateTime<Utc>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, session| session.updated_at >= cutoff);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} idle sessions", evicted);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcp_core::research::{ApprovalStatus, ReviewRow};

    const JSON_RESULT: &str = r#"{
        "durable_medical_equipment": [
            {"item_name": "Hospital bed", "price": "$1,850.00", "replacement_frequency": "every 10 years"}
        ],
        "medications": []
    }"#;

    #[test]
    fn structured_result_seeds_reviews() {
        let mut session = ResearchSession::new();
        session.record_result(JSON_RESULT);

        let data = session.research_data.as_ref().unwrap();
        assert_eq!(data.item_count(), 1);
        assert_eq!(session.reviews.categories().len(), 1);
        assert_eq!(session.reviews.categories()[0].rows[0].cost, 1850.0);
        assert_eq!(session.status_message.as_deref(), Some(RESEARCH_COMPLETED));
    }

    #[test]
    fn plain_text_result_kept_raw() {
        let mut session = ResearchSession::new();
        session.record_result("I could not find pricing for this case.");

        assert!(session.research_data.is_none());
        assert!(session.reviews.is_empty());
        assert_eq!(
            session.raw_response.as_deref(),
            Some("I could not find pricing for this case.")
        );
        assert_eq!(session.status_message.as_deref(), Some(NON_JSON_OUTPUT));
    }

    #[test]
    fn new_result_discards_previous_edits() {
        let mut session = ResearchSession::new();
        session.record_result(JSON_RESULT);
        session
            .reviews
            .replace_rows(
                "durable_medical_equipment",
                vec![ReviewRow::new("Hospital bed", 1500.0).with_approval(ApprovalStatus::Approved)],
            )
            .unwrap();

        session.record_result(JSON_RESULT);
        let rows = &session.reviews.categories()[0].rows;
        assert_eq!(rows[0].doctor_approval, ApprovalStatus::Pending);
        assert_eq!(rows[0].cost, 1850.0);
    }

    #[test]
    fn failure_clears_results() {
        let mut session = ResearchSession::new();
        session.record_result(JSON_RESULT);
        session.record_failure("Stage 'planner' failed: timeout");

        assert!(session.research_data.is_none());
        assert!(session.reviews.is_empty());
        assert_eq!(
            session.last_error.as_deref(),
            Some("Research failed: Stage 'planner' failed: timeout")
        );
    }

    #[tokio::test]
    async fn store_update_and_get() {
        let store = SessionStore::default();
        let session = store.create().await;

        let updated = store
            .update(session.id, |s| {
                s.set_location("  Austin, TX ");
                s.location_input.clone()
            })
            .await;
        assert_eq!(updated.as_deref(), Some("Austin, TX"));
        assert_eq!(store.get(session.id).await.unwrap().location_input, "Austin, TX");
        assert!(store.update(Uuid::new_v4(), |_| ()).await.is_none());
        assert_eq!(store.len().await, 1);
    }

    fn idle_for(session: &mut ResearchSession, idle: chrono::Duration) {
        session.updated_at = Utc::now() - idle;
    }

    #[tokio::test]
    async fn create_evicts_idle_sessions() {
        let store = SessionStore::new(Duration::from_secs(60 * 60));
        let stale = store.create().await;
        let fresh = store.create().await;
        store
            .update(stale.id, |s| idle_for(s, chrono::Duration::hours(2)))
            .await;

        let newest = store.create().await;

        assert!(store.get(stale.id).await.is_none());
        assert!(store.get(fresh.id).await.is_some());
        assert!(store.get(newest.id).await.is_some());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn prune_keeps_recently_changed_sessions() {
        let store = SessionStore::new(Duration::from_secs(60 * 60));
        let first = store.create().await;
        let second = store.create().await;
        store
            .update(first.id, |s| idle_for(s, chrono::Duration::hours(3)))
            .await;
        store
            .update(second.id, |s| {
                idle_for(s, chrono::Duration::hours(3));
                s.set_location("Austin, TX");
            })
            .await;

        assert_eq!(store.prune_expired().await, 1);
        assert!(store.get(first.id).await.is_none());
        assert!(store.get(second.id).await.is_some());
    }

    #[tokio::test]
    async fn remove_drops_session() {
        let store = SessionStore::default();
        let session = store.create().await;

        assert_eq!(store.remove(session.id).await.map(|s| s.id), Some(session.id));
        assert!(store.remove(session.id).await.is_none());
        assert_eq!(store.len().await, 0);
    }
}
