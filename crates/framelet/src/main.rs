mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use framelet_core::extract::{self, ExtractConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Extract {
            input,
            output,
            size,
            prefix,
            sample_rate,
            max_frames,
            debug_frames,
        } => {
            info!(?input, ?output, size, "starting extraction");

            let config = ExtractConfig {
                final_size: size,
                prefix,
                sample_rate,
                max_frames,
                debug_frames_dir: debug_frames,
            };

            let report =
                extract::run_extract(&input, &output, &config).context("extraction failed")?;

            info!(
                frames_decoded = report.frames_decoded,
                frames_written = report.frames_written,
                ?output,
                "extraction finished"
            );

            println!("Total frames: {}", report.frames_written);

            Ok(())
        }
    }
}
