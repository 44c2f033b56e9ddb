pub mod analysis;
pub mod capture;
pub mod cli;
mod commands;
pub mod db;
pub mod export;
pub mod models;
pub mod recorder;
pub mod recovery;
pub mod settings;
mod utils;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use log::info;

use cli::{Cli, Commands};
use db::Database;
use settings::SettingsStore;

pub use analysis::{analyze, BoundingBox, TrajectoryAnalysis};
pub use models::TrajectoryPoint;

pub(crate) struct AppState {
    pub(crate) db: Database,
    pub(crate) settings: SettingsStore,
}

fn init_logging(verbose: bool) {
    let debug_mode = std::env::var("MOUSETRAIL_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // Reads RUST_LOG; --verbose or MOUSETRAIL_DEBUG force debug output.
    let mut builder = env_logger::Builder::from_default_env();
    if verbose || debug_mode {
        builder.filter_level(log::LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(log::LevelFilter::Info);
    }
    let _ = builder.try_init();
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir),
        None => dirs::data_dir()
            .map(|dir| dir.join("mousetrail"))
            .ok_or_else(|| anyhow!("no platform data directory; pass --data-dir")),
    }
}

async fn open_state(data_dir: PathBuf) -> Result<AppState> {
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let database = Database::new(data_dir.join("mouse_trajectory.sqlite3"))?;

    // Finalize recordings whose process exited without stopping them.
    recovery::recover_abandoned_sessions(&database, recovery::process_is_running).await?;

    let settings = SettingsStore::new(data_dir.join("settings.json"))?;

    Ok(AppState {
        db: database,
        settings,
    })
}

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);
    info!("mousetrail {} starting up", env!("CARGO_PKG_VERSION"));

    let data_dir = resolve_data_dir(cli.data_dir)?;
    let state = open_state(data_dir).await?;

    match cli.command {
        Commands::Record(args) => commands::record(&state, args).await,
        Commands::Analyze { session_id, json } => {
            commands::analyze(&state, &session_id, json).await
        }
        Commands::Sessions { limit, json } => commands::sessions(&state, limit, json).await,
        Commands::Export {
            session_id,
            output,
            width,
            height,
        } => commands::export(&state, &session_id, &output, width, height).await,
        Commands::Clear { session_id } => commands::clear(&state, &session_id).await,
        Commands::Config(args) => commands::config(&state, args),
    }
}
