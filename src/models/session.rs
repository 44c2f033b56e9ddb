//! Recording session model.
//!
//! A session groups every point captured between a start and a stop action.
//! Once a session leaves `Running` its point set is frozen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Running,
    Completed,
    Cancelled,
    Interrupted,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "Running",
            SessionStatus::Completed => "Completed",
            SessionStatus::Cancelled => "Cancelled",
            SessionStatus::Interrupted => "Interrupted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Process recording into this session. `None` for rows written before
    /// owners were tracked.
    pub owner_pid: Option<u32>,
}

impl Session {
    /// New `Running` session starting at `started_at`, owned by this process.
    pub fn start(id: String, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            started_at,
            stopped_at: None,
            status: SessionStatus::Running,
            created_at: started_at,
            updated_at: started_at,
            owner_pid: Some(std::process::id()),
        }
    }
}

/// Session row plus the number of points recorded for it, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub point_count: u64,
}

impl SessionInfo {
    pub fn new(session: Session, point_count: u64) -> Self {
        Self {
            id: session.id,
            started_at: session.started_at,
            stopped_at: session.stopped_at,
            status: session.status,
            point_count,
        }
    }
}
