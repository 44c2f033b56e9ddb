use std::{path::Path, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use tokio::time::Duration;

use crate::{
    analysis::TrajectoryAnalysis,
    capture::{CursorSource, SimulatedCursor, SystemCursor},
    cli::{ConfigArgs, RecordArgs},
    db::{MemoryStore, TrajectoryStore},
    export::export_png,
    recorder::{load_and_analyze, RecordingController, RecordingSummary},
    settings::CaptureSourceKind,
    AppState,
};

pub async fn record(state: &AppState, args: RecordArgs) -> Result<()> {
    let mut capture = state.settings.capture();
    if args.simulate {
        capture.source = CaptureSourceKind::Simulated;
    }

    if args.export.is_some() {
        state.settings.export().validate()?;
    }

    let source = build_source(capture.source)?;
    let interval = Duration::from_millis(capture.sample_interval_ms);

    let summary = if args.ephemeral {
        record_with(Arc::new(MemoryStore::new()), source, interval, args.duration).await?
    } else {
        record_with(Arc::new(state.db.clone()), source, interval, args.duration).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Session {}", summary.session.id);
        println!("{}", summary.analysis);
    }

    if let Some(path) = args.export.as_deref() {
        export_png(&summary.points, &state.settings.export(), path)?;
        if !args.json {
            println!("Saved path image to {}", path.display());
        }
    }

    Ok(())
}

fn build_source(kind: CaptureSourceKind) -> Result<Box<dyn CursorSource>> {
    let source: Box<dyn CursorSource> = match kind {
        CaptureSourceKind::System => Box::new(SystemCursor::new()?),
        CaptureSourceKind::Simulated => Box::new(SimulatedCursor::new()),
    };
    Ok(source)
}

async fn record_with<S: TrajectoryStore>(
    store: Arc<S>,
    source: Box<dyn CursorSource>,
    interval: Duration,
    duration_secs: u64,
) -> Result<RecordingSummary> {
    let controller = RecordingController::new(store, interval);
    let session = controller.start_recording(source).await?;

    if duration_secs == 0 {
        eprintln!("Recording session {} - press Ctrl-C to stop", session.id);
    } else {
        eprintln!(
            "Recording session {} for {}s - press Ctrl-C to stop early",
            session.id, duration_secs
        );
    }

    if let Err(err) = wait_for_stop(duration_secs).await {
        controller.cancel_recording().await?;
        return Err(err);
    }

    controller.stop_recording().await
}

async fn wait_for_stop(duration_secs: u64) -> Result<()> {
    if duration_secs == 0 {
        return tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl-C");
    }

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(duration_secs)) => Ok(()),
        res = tokio::signal::ctrl_c() => res.context("failed to listen for Ctrl-C"),
    }
}

pub async fn analyze(state: &AppState, session_id: &str, json: bool) -> Result<()> {
    let session = state
        .db
        .get_session(session_id)
        .await?
        .ok_or_else(|| anyhow!("Session {session_id} not found"))?;

    let (_, analysis) = load_and_analyze(&state.db, &session.id).await?;
    print_analysis(&session.id, session.status.as_str(), &analysis, json)
}

fn print_analysis(
    session_id: &str,
    status: &str,
    analysis: &TrajectoryAnalysis,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
    } else {
        println!("Session {session_id} ({status})");
        println!("{analysis}");
    }
    Ok(())
}

pub async fn sessions(state: &AppState, limit: usize, json: bool) -> Result<()> {
    let sessions = state.db.list_sessions(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("No recorded sessions");
        return Ok(());
    }

    println!("{:<36}  {:<25}  {:<11}  {:>8}", "SESSION", "STARTED", "STATUS", "POINTS");
    for session in sessions {
        println!(
            "{:<36}  {:<25}  {:<11}  {:>8}",
            session.id,
            session.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            session.status.as_str(),
            session.point_count
        );
    }
    Ok(())
}

pub async fn export(
    state: &AppState,
    session_id: &str,
    output: &Path,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<()> {
    if state.db.get_session(session_id).await?.is_none() {
        bail!("Session {session_id} not found");
    }

    let mut settings = state.settings.export();
    if let Some(width) = width {
        settings.width = width;
    }
    if let Some(height) = height {
        settings.height = height;
    }

    settings.validate()?;

    let points = state.db.get_points_for_session(session_id).await?;
    export_png(&points, &settings, output)?;
    println!("Saved {} points to {}", points.len(), output.display());
    Ok(())
}

pub async fn clear(state: &AppState, session_id: &str) -> Result<()> {
    if !state.db.delete_session(session_id).await? {
        bail!("Session {session_id} not found");
    }
    println!("Cleared session {session_id}");
    Ok(())
}

pub fn config(state: &AppState, args: ConfigArgs) -> Result<()> {
    let mut capture = state.settings.capture();
    let capture_changed = args.sample_interval_ms.is_some() || args.source.is_some();
    if let Some(interval) = args.sample_interval_ms {
        if interval == 0 {
            bail!("sample interval must be greater than zero");
        }
        capture.sample_interval_ms = interval;
    }
    if let Some(source) = args.source {
        capture.source = source;
    }
    if capture_changed {
        state.settings.update_capture(capture)?;
    }

    let mut export = state.settings.export();
    let export_changed = args.export_width.is_some()
        || args.export_height.is_some()
        || args.export_padding.is_some()
        || args.line_width.is_some();
    if let Some(width) = args.export_width {
        export.width = width;
    }
    if let Some(height) = args.export_height {
        export.height = height;
    }
    if let Some(padding) = args.export_padding {
        export.padding = padding;
    }
    if let Some(line_width) = args.line_width {
        export.line_width = line_width;
    }
    if export_changed {
        export.validate()?;
        state.settings.update_export(export)?;
    }

    let current = serde_json::json!({
        "capture": state.settings.capture(),
        "export": state.settings.export(),
    });
    println!("{}", serde_json::to_string_pretty(&current)?);
    Ok(())
}
