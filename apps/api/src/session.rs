//! Per-session screening state, keyed by a session id.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::candidate::Candidate;
use crate::models::job::JobDescriptionSource;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub job_description: String,
    pub job_description_source: Option<JobDescriptionSource>,
    pub candidates: Vec<Candidate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            job_description: String::new(),
            job_description_source: None,
            candidates: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Starts an empty session and returns its id.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().await.insert(id, Session::new(id));
        id
    }

    /// Stores a job description and clears candidates scored against an
    /// earlier one. Returns false for unknown sessions.
    pub async fn set_job_description(
        &self,
        id: Uuid,
        text: String,
        source: JobDescriptionSource,
    ) -> bool {
        match self.sessions.write().await.get_mut(&id) {
            Some(session) => {
                session.job_description = text;
                session.job_description_source = Some(source);
                session.candidates.clear();
                session.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// The session's job description, or `None` if unset or empty.
    pub async fn job_description(&self, id: Uuid) -> Option<String> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|s| s.job_description.clone())
            .filter(|jd| !jd.is_empty())
    }

    /// Replaces the candidate list wholesale. Returns false for unknown sessions.
    pub async fn set_candidates(&self, id: Uuid, candidates: Vec<Candidate>) -> bool {
        match self.sessions.write().await.get_mut(&id) {
            Some(session) => {
                session.candidates = candidates;
                session.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn candidates(&self, id: Uuid) -> Option<Vec<Candidate>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|s| s.candidates.clone())
    }

    /// Drops sessions idle for longer than `ttl`. Returns how many were removed.
    pub async fn purge_expired(&self, ttl: chrono::Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.updated_at >= cutoff);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
