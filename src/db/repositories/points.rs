use anyhow::{Context, Result};
use rusqlite::params;

use crate::db::{connection::Database, helpers::to_u64};
use crate::models::TrajectoryPoint;

impl Database {
    pub async fn insert_point(&self, session_id: &str, point: TrajectoryPoint) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO mouse_trajectory (x_position, y_position, timestamp, session_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![point.x, point.y, point.timestamp, session_id],
            )
            .with_context(|| format!("failed to insert point for session {session_id}"))?;
            Ok(())
        })
        .await
    }

    /// All points of a session ordered by timestamp, insertion order breaking
    /// ties.
    pub async fn get_points_for_session(&self, session_id: &str) -> Result<Vec<TrajectoryPoint>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT x_position, y_position, timestamp
                 FROM mouse_trajectory
                 WHERE session_id = ?1
                 ORDER BY timestamp ASC, id ASC",
            )?;

            let points_iter = stmt.query_map(params![session_id], |row| {
                Ok(TrajectoryPoint {
                    x: row.get(0)?,
                    y: row.get(1)?,
                    timestamp: row.get(2)?,
                })
            })?;

            let mut points = Vec::new();
            for point in points_iter {
                points.push(point?);
            }

            log::debug!("Loaded {} points for session {}", points.len(), session_id);
            Ok(points)
        })
        .await
    }

    pub async fn count_points_for_session(&self, session_id: &str) -> Result<u64> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM mouse_trajectory WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )?;
            to_u64(count, "point count")
        })
        .await
    }
}
