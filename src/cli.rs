use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ladderforge")]
#[command(author, version, about = "Encode a video into an adaptive-bitrate HLS ladder")]
pub struct Cli {
    /// Path to config file
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
    /// Encode a source video into every rendition and write the master playlist
    Encode {
        /// Source video file
        #[arg(required = true)]
        input: PathBuf,

        /// Base directory for run roots (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List completed runs, newest first
    List {
        /// Base directory to scan (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active rendition ladder
    Ladder {
        /// Print the master playlist this ladder produces instead of a table
        #[arg(long)]
        manifest: bool,
    },

    /// Check each rendition of a finished run against its advertised resolution
    Verify {
        /// Run root containing manifest.m3u8
        #[arg(required = true)]
        root: PathBuf,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
