use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_optional_datetime, parse_status, to_pid, to_u64},
};
use crate::models::{Session, SessionInfo, SessionStatus};

fn row_to_session(row: &Row) -> Result<Session> {
    let started_at: String = row.get("started_at")?;
    let stopped_at: Option<String> = row.get("stopped_at")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let status: String = row.get("status")?;
    let owner_pid: Option<i64> = row.get("owner_pid")?;

    Ok(Session {
        id: row.get("id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        stopped_at: parse_optional_datetime(stopped_at, "stopped_at")?,
        status: parse_status(&status)?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
        owner_pid: to_pid(owner_pid, "owner_pid")?,
    })
}

impl Database {
    pub async fn insert_session(&self, session: &Session) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO sessions
                     (id, started_at, stopped_at, status, created_at, updated_at, owner_pid)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    record.started_at.to_rfc3339(),
                    record
                        .stopped_at
                        .as_ref()
                        .map(|dt| dt.to_rfc3339()),
                    record.status.as_str(),
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                    record.owner_pid,
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn mark_session_status(
        &self,
        session_id: &str,
        status: SessionStatus,
        stopped_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE sessions
                 SET status = ?1,
                     stopped_at = ?2,
                     updated_at = ?3
                 WHERE id = ?4",
                params![
                    status.as_str(),
                    stopped_at.map(|dt| dt.to_rfc3339()),
                    updated_at.to_rfc3339(),
                    session_id,
                ],
            )?;

            if rows_affected == 0 {
                return Err(anyhow!("Session {session_id} not found"));
            }

            Ok(())
        })
        .await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, stopped_at, status, created_at, updated_at, owner_pid
                 FROM sessions
                 WHERE id = ?1",
            )?;

            let session = stmt
                .query_row(params![session_id], |row| Ok(row_to_session(row)))
                .optional()?;
            session.transpose()
        })
        .await
    }

    /// Every session still marked `Running`, newest first.
    pub async fn get_incomplete_sessions(&self) -> Result<Vec<Session>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, started_at, stopped_at, status, created_at, updated_at, owner_pid
                 FROM sessions
                 WHERE status = 'Running'
                 ORDER BY started_at DESC",
            )?;

            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    pub async fn mark_session_interrupted(
        &self,
        session_id: &str,
        stopped_at: DateTime<Utc>,
    ) -> Result<()> {
        self.mark_session_status(
            session_id,
            SessionStatus::Interrupted,
            Some(stopped_at),
            stopped_at,
        )
        .await
    }

    /// Most recent sessions first, each with its recorded point count.
    pub async fn list_sessions(&self, limit: usize) -> Result<Vec<SessionInfo>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT s.id, s.started_at, s.stopped_at, s.status, s.created_at, s.updated_at,
                        s.owner_pid, COUNT(t.id) AS point_count
                 FROM sessions s
                 LEFT JOIN mouse_trajectory t ON t.session_id = s.id
                 GROUP BY s.id
                 ORDER BY s.started_at DESC
                 LIMIT ?1",
            )?;

            let mut rows = stmt.query(params![limit])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                let point_count: i64 = row.get("point_count")?;
                sessions.push(SessionInfo::new(
                    row_to_session(row)?,
                    to_u64(point_count, "point_count")?,
                ));
            }

            Ok(sessions)
        })
        .await
    }

    /// Delete a session together with its recorded points.
    ///
    /// Points go away through the `ON DELETE CASCADE` on `mouse_trajectory`.
    /// Returns whether a session row existed.
    pub async fn delete_session(&self, session_id: &str) -> Result<bool> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let rows_affected =
                conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
            Ok(rows_affected > 0)
        })
        .await
    }
}
