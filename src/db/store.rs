//! Storage seam used by the recorder and capture loop.
//!
//! `Database` is the persistent implementation. `MemoryStore` keeps
//! everything in process and is dropped with the recording.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::models::{Session, SessionStatus, TrajectoryPoint};

use super::Database;

#[async_trait]
pub trait TrajectoryStore: Send + Sync + 'static {
    async fn create_session(&self, session: &Session) -> Result<()>;

    async fn finish_session(
        &self,
        session_id: &str,
        status: SessionStatus,
        stopped_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn append_point(&self, session_id: &str, point: TrajectoryPoint) -> Result<()>;

    /// Points of one session ordered by timestamp; points sharing a
    /// timestamp keep their append order.
    async fn points_for_session(&self, session_id: &str) -> Result<Vec<TrajectoryPoint>>;
}

#[async_trait]
impl TrajectoryStore for Database {
    async fn create_session(&self, session: &Session) -> Result<()> {
        self.insert_session(session).await
    }

    async fn finish_session(
        &self,
        session_id: &str,
        status: SessionStatus,
        stopped_at: DateTime<Utc>,
    ) -> Result<()> {
        self.mark_session_status(session_id, status, Some(stopped_at), stopped_at)
            .await
    }

    async fn append_point(&self, session_id: &str, point: TrajectoryPoint) -> Result<()> {
        self.insert_point(session_id, point).await
    }

    async fn points_for_session(&self, session_id: &str) -> Result<Vec<TrajectoryPoint>> {
        self.get_points_for_session(session_id).await
    }
}

#[derive(Default)]
struct MemoryState {
    sessions: HashMap<String, Session>,
    points: HashMap<String, Vec<TrajectoryPoint>>,
}

/// In-process store with the same read ordering as `Database`.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session(&self, session_id: &str) -> Option<Session> {
        self.state.lock().await.sessions.get(session_id).cloned()
    }

    pub async fn sessions(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> =
            self.state.lock().await.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        sessions
    }
}

#[async_trait]
impl TrajectoryStore for MemoryStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.sessions.contains_key(&session.id) {
            return Err(anyhow!("Session {} already exists", session.id));
        }
        state.sessions.insert(session.id.clone(), session.clone());
        state.points.insert(session.id.clone(), Vec::new());
        Ok(())
    }

    async fn finish_session(
        &self,
        session_id: &str,
        status: SessionStatus,
        stopped_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| anyhow!("Session {session_id} not found"))?;
        session.status = status;
        session.stopped_at = Some(stopped_at);
        session.updated_at = stopped_at;
        Ok(())
    }

    async fn append_point(&self, session_id: &str, point: TrajectoryPoint) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .points
            .get_mut(session_id)
            .ok_or_else(|| anyhow!("Session {session_id} not found"))?
            .push(point);
        Ok(())
    }

    async fn points_for_session(&self, session_id: &str) -> Result<Vec<TrajectoryPoint>> {
        let mut points = {
            let state = self.state.lock().await;
            state.points.get(session_id).cloned().unwrap_or_default()
        };
        // Stable sort, so equal timestamps stay in append order.
        points.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Ok(points)
    }
}
