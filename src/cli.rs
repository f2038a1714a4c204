use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture per-frame diagnostics and classify frame types
    Frames {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Print the raw diagnostic lines instead of classified frames
        #[arg(long)]
        raw: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Extract the audio track into <work-dir>/audio.mkv
    Audio {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Existing working directory for the output file
        #[arg(short, long)]
        work_dir: PathBuf,

        /// Encoder options passed to ffmpeg verbatim (defaults to the configured ones)
        #[arg(last = true, allow_hyphen_values = true)]
        params: Vec<String>,
    },

    /// Check that the configured ffmpeg binary can be launched
    Check,
}
