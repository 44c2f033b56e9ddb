use std::sync::Arc;

use chrono::Utc;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::db::TrajectoryStore;
use crate::models::{CursorPosition, TrajectoryPoint};

use super::source::CursorSource;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Consecutive sampling failures after which the loop logs a warning once.
const FAILURE_WARN_THRESHOLD: u32 = 50;

/// Sample `source` every `sample_interval` and append a point to `store`
/// whenever the cursor has moved since the last recorded point.
///
/// Runs until `cancel_token` fires and returns the number of points recorded.
pub async fn capture_loop<S>(
    session_id: String,
    store: Arc<S>,
    mut source: Box<dyn CursorSource>,
    sample_interval: Duration,
    cancel_token: CancellationToken,
) -> u64
where
    S: TrajectoryStore + ?Sized,
{
    let mut ticker = tokio::time::interval(sample_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_recorded: Option<CursorPosition> = None;
    let mut recorded: u64 = 0;
    let mut consecutive_failures: u32 = 0;

    log_info!(
        "capture loop started for session {} ({}ms interval)",
        session_id,
        sample_interval.as_millis()
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("capture loop shutting down after {} points", recorded);
                break;
            }
            _ = ticker.tick() => {
                let position = match source.position() {
                    Ok(position) => {
                        consecutive_failures = 0;
                        position
                    }
                    Err(err) => {
                        consecutive_failures += 1;
                        if consecutive_failures == FAILURE_WARN_THRESHOLD {
                            log_warn!("cursor sampling failing repeatedly for session {}: {err:?}", session_id);
                        } else {
                            log_debug!("cursor sampling failed: {err:?}");
                        }
                        continue;
                    }
                };

                if last_recorded == Some(position) {
                    continue;
                }

                let point = TrajectoryPoint::at(position, Utc::now());
                match store.append_point(&session_id, point).await {
                    Ok(()) => {
                        last_recorded = Some(position);
                        recorded += 1;
                        log_debug!("recorded cursor position ({}, {})", point.x, point.y);
                    }
                    Err(err) => log_error!("failed to persist point for session {}: {err:?}", session_id),
                }
            }
        }
    }

    recorded
}
