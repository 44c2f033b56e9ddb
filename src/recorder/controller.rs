use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use tokio::{sync::Mutex, time::Duration};
use uuid::Uuid;

use crate::{
    analysis::{analyze, TrajectoryAnalysis},
    capture::{CaptureController, CursorSource},
    db::TrajectoryStore,
    models::{Session, SessionStatus, TrajectoryPoint},
};

/// Result of a finished recording: the frozen session, its points in storage
/// order and their analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSummary {
    pub session: Session,
    #[serde(skip)]
    pub points: Vec<TrajectoryPoint>,
    pub analysis: TrajectoryAnalysis,
}

#[derive(Default)]
struct RecorderState {
    session: Option<Session>,
    capture: CaptureController,
}

/// Drives one recording at a time: start creates a session and begins
/// capture, stop freezes it and runs the analysis.
pub struct RecordingController<S: TrajectoryStore> {
    store: Arc<S>,
    state: Mutex<RecorderState>,
    sample_interval: Duration,
}

impl<S: TrajectoryStore> RecordingController<S> {
    pub fn new(store: Arc<S>, sample_interval: Duration) -> Self {
        Self {
            store,
            state: Mutex::new(RecorderState::default()),
            sample_interval,
        }
    }

    pub async fn is_recording(&self) -> bool {
        self.state.lock().await.session.is_some()
    }

    pub async fn current_session_id(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .session
            .as_ref()
            .map(|session| session.id.clone())
    }

    pub async fn start_recording(&self, source: Box<dyn CursorSource>) -> Result<Session> {
        let mut state = self.state.lock().await;
        if state.session.is_some() {
            return Err(anyhow!("recording already active"));
        }

        let session = Session::start(Uuid::new_v4().to_string(), Utc::now());
        self.store
            .create_session(&session)
            .await
            .context("failed to create recording session")?;

        if let Err(err) = state.capture.start_capture(
            session.id.clone(),
            Arc::clone(&self.store),
            source,
            self.sample_interval,
        ) {
            warn!("Capture failed to start for session {}: {err:?}", session.id);
            self.store
                .finish_session(&session.id, SessionStatus::Cancelled, Utc::now())
                .await?;
            return Err(err);
        }

        info!("Recording started, session id: {}", session.id);
        state.session = Some(session.clone());
        Ok(session)
    }

    /// Stop capture, mark the session completed and analyse its points.
    ///
    /// Capture is fully stopped before points are read, so the analysis sees
    /// a frozen snapshot.
    pub async fn stop_recording(&self) -> Result<RecordingSummary> {
        let mut state = self.state.lock().await;
        let mut session = state
            .session
            .take()
            .ok_or_else(|| anyhow!("no active recording"))?;

        state.capture.stop_capture().await?;

        let stopped_at = Utc::now();
        self.store
            .finish_session(&session.id, SessionStatus::Completed, stopped_at)
            .await
            .context("failed to mark session completed")?;
        session.status = SessionStatus::Completed;
        session.stopped_at = Some(stopped_at);
        session.updated_at = stopped_at;

        let (points, analysis) = load_and_analyze(self.store.as_ref(), &session.id).await?;
        info!(
            "Recording stopped, session id: {} ({} points)",
            session.id, analysis.point_count
        );

        Ok(RecordingSummary {
            session,
            points,
            analysis,
        })
    }

    /// Stop capture and discard the session's outcome without analysing it.
    pub async fn cancel_recording(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let session = state
            .session
            .take()
            .ok_or_else(|| anyhow!("no active recording"))?;

        state.capture.stop_capture().await?;
        self.store
            .finish_session(&session.id, SessionStatus::Cancelled, Utc::now())
            .await?;

        info!("Recording cancelled, session id: {}", session.id);
        Ok(())
    }
}

/// Read a session's points from `store` and analyse them.
pub async fn load_and_analyze<S>(
    store: &S,
    session_id: &str,
) -> Result<(Vec<TrajectoryPoint>, TrajectoryAnalysis)>
where
    S: TrajectoryStore + ?Sized,
{
    let points = store
        .points_for_session(session_id)
        .await
        .with_context(|| format!("failed to load points for session {session_id}"))?;
    let analysis = analyze(&points);
    Ok((points, analysis))
}
