use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::db::TrajectoryStore;

use super::loop_worker::capture_loop;
use super::source::CursorSource;

/// Owns the background capture task of the active session.
#[derive(Default)]
pub struct CaptureController {
    handle: Option<JoinHandle<u64>>,
    cancel_token: Option<CancellationToken>,
}

impl CaptureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start_capture<S>(
        &mut self,
        session_id: String,
        store: Arc<S>,
        source: Box<dyn CursorSource>,
        sample_interval: Duration,
    ) -> Result<()>
    where
        S: TrajectoryStore + ?Sized,
    {
        if self.handle.is_some() {
            bail!("capture already active");
        }
        if sample_interval.is_zero() {
            bail!("sample interval must be greater than zero");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(capture_loop(
            session_id,
            store,
            source,
            sample_interval,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Cancel the capture task and wait for it to finish, so no point is
    /// appended after this returns. Yields the number of points recorded.
    pub async fn stop_capture(&mut self) -> Result<u64> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        match self.handle.take() {
            Some(handle) => {
                let recorded = handle.await.context("capture loop task failed to join")?;
                info!("Capture stopped with {recorded} points recorded");
                Ok(recorded)
            }
            None => Ok(0),
        }
    }
}
