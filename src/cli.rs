//! Command-line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::settings::CaptureSourceKind;

/// Record the cursor's on-screen path and summarise its trajectory
#[derive(Parser, Debug)]
#[command(name = "mousetrail")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the database and settings
    #[arg(long, global = true, env = "MOUSETRAIL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record cursor movement, then print the trajectory analysis
    Record(RecordArgs),

    /// Analyse a stored session
    Analyze {
        /// Session identifier
        session_id: String,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// List recorded sessions, newest first
    Sessions {
        /// Maximum number of sessions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a stored session's path to a PNG image
    Export {
        /// Session identifier
        session_id: String,

        /// Output PNG path
        output: PathBuf,

        /// Image width in pixels (defaults to the configured width)
        #[arg(long)]
        width: Option<u32>,

        /// Image height in pixels (defaults to the configured height)
        #[arg(long)]
        height: Option<u32>,
    },

    /// Delete a session and its recorded points
    Clear {
        /// Session identifier
        session_id: String,
    },

    /// Show settings, updating any that are given
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Recording duration in seconds (0 = until Ctrl-C)
    #[arg(short, long, default_value = "0")]
    pub duration: u64,

    /// Keep points in memory only; nothing is written to the database
    #[arg(long)]
    pub ephemeral: bool,

    /// Use a simulated cursor instead of the system pointer
    #[arg(long)]
    pub simulate: bool,

    /// Also export the recorded path as a PNG
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Cursor sampling interval in milliseconds
    #[arg(long)]
    pub sample_interval_ms: Option<u64>,

    /// Default cursor source
    #[arg(long, value_enum)]
    pub source: Option<CaptureSourceKind>,

    /// Default export width in pixels
    #[arg(long)]
    pub export_width: Option<u32>,

    /// Default export height in pixels
    #[arg(long)]
    pub export_height: Option<u32>,

    /// Export padding in pixels
    #[arg(long)]
    pub export_padding: Option<u32>,

    /// Export line width in pixels
    #[arg(long)]
    pub line_width: Option<u32>,
}
