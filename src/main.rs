//! Mediatap - ffmpeg frame type probing and audio extraction
//!
//! Command-line entry point around the `mediatap` library.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, warn};

use mediatap::cli::{Args, Commands};
use mediatap::config::Config;
use mediatap::frame_types::{classify, FrameTypeSummary};
use mediatap::logging;
use mediatap::media::{AudioOutcome, MediaProcessorFactory};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Console and daily log file; the guard flushes the file on exit
    let _log_guard = logging::init(args.verbose, &std::env::current_dir()?)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    let media = MediaProcessorFactory::create_processor(config.media.clone());

    match args.command {
        Commands::Frames { input, raw, json } => {
            let spinner = spinner(format!("Probing frames of {}", input.display()));
            let sequence = media.probe_frame_types(&input).await;
            spinner.finish_and_clear();
            let sequence = sequence?;

            if !sequence.success() {
                warn!("ffmpeg exited with {:?}, output may be incomplete", sequence.exit_code);
            }

            if raw {
                if json {
                    println!("{}", serde_json::to_string_pretty(&sequence)?);
                } else {
                    for line in &sequence.lines {
                        println!("{}", line);
                    }
                }
                return Ok(());
            }

            let frames = classify(&sequence.lines);
            let summary = FrameTypeSummary::from_frames(&frames);

            if json {
                let report = serde_json::json!({
                    "summary": summary,
                    "frames": frames,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{:<10} {:<6} {:<6} {:<12}", "Frame", "Type", "Key", "Time (s)");
                println!("{}", "-".repeat(36));
                for frame in &frames {
                    let time = frame
                        .pts_time
                        .map(|t| format!("{:.3}", t))
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:<10} {:<6} {:<6} {:<12}",
                        frame.index,
                        frame.frame_type.to_string(),
                        if frame.key { "yes" } else { "" },
                        time
                    );
                }
                println!(
                    "\n{} frames: {} keyframes, I={} P={} B={} other={}",
                    summary.total,
                    summary.keyframes,
                    summary.i_frames,
                    summary.p_frames,
                    summary.b_frames,
                    summary.other
                );
            }
        }
        Commands::Audio { input, work_dir, params } => {
            let params = if params.is_empty() {
                config.media.audio_params.clone()
            } else {
                params
            };

            let spinner = spinner(format!("Extracting audio from {}", input.display()));
            let outcome = media.extract_audio(&input, &work_dir, &params).await;
            spinner.finish_and_clear();

            match outcome? {
                AudioOutcome::NoAudioStream => {
                    println!("No audio stream found in {}", input.display());
                }
                AudioOutcome::Extracted { path, exit_code } => {
                    if exit_code != Some(0) {
                        warn!("ffmpeg exited with {:?} while extracting audio", exit_code);
                    }
                    println!("Audio written to {}", path.display());
                }
            }
        }
        Commands::Check => {
            media.check_availability()?;
            let version = media.get_version_info().await?;
            println!("{}", version);
        }
    }

    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
