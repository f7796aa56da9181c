use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hlsrec")]
#[command(author, version, about = "Segmented recording with progressive HLS playlists")]
pub struct Cli {
    /// Path to config file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a segment event log and write segments plus playlist
    Ingest {
        /// JSON-lines event log to replay
        #[arg(required = true)]
        events: PathBuf,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// File name prefix for segments and playlist (overrides config)
        #[arg(long)]
        prefix: Option<String>,

        /// Preferred segment interval in seconds (overrides config)
        #[arg(long)]
        interval: Option<f64>,

        /// Write segments only, without a playlist
        #[arg(long)]
        no_manifest: bool,

        /// Print emitted events as JSON lines
        #[arg(long)]
        print_events: bool,
    },

    /// Render a JSON playlist description as M3U8
    Render {
        /// Playlist description file
        #[arg(required = true)]
        playlist: PathBuf,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
