use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "framelet", about = "Video-to-training-frame extractor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract a video into letterboxed square frame images.
    Extract {
        /// Path to the input video file (MP4, MOV, etc.).
        #[arg(short, long)]
        input: PathBuf,

        /// Directory to write frame images to (created if absent).
        #[arg(short, long)]
        output: PathBuf,

        /// Side length of the square output canvas, in pixels.
        #[arg(short, long, default_value_t = 1024)]
        size: u32,

        /// Output files are named <prefix>_<index>.jpg.
        #[arg(short, long, default_value = "frame")]
        prefix: String,

        /// Keep every Nth decoded frame (1 = every frame).
        #[arg(long, default_value_t = 1)]
        sample_rate: u32,

        /// Stop after writing this many frames.
        #[arg(long)]
        max_frames: Option<u32>,

        /// Directory to save debug frames with placement overlays.
        #[arg(long)]
        debug_frames: Option<PathBuf>,
    },
}
