//! Application entry point — img2speech.
//!
//! # Startup sequence
//!
//! 1. Parse the command line and initialise logging.
//! 2. Load [`AppConfig`] (default on first run) and overlay credentials
//!    from the environment / `.env`.
//! 3. Build the [`Backends`] holder and the [`PipelineRunner`].
//! 4. Read and validate the image.
//! 5. Run the pipeline, printing each stage result as it arrives.  A failed
//!    stage is reported there and the process exits with status 1.
//! 6. Write the WAV if audio was produced.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;

use img2speech::{
    backends::Backends,
    cli::Cli,
    config::{AppConfig, Credentials},
    input::ImageInput,
    pipeline::{PipelineEvent, PipelineRunner, Stage},
    speech::AudioResult,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // 1. Command line + logging
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    // 2. Configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        }),
    };
    let config = config.with_credentials(&Credentials::from_env());

    // 3. Backends + runner
    let backends = Arc::new(Backends::from_config(&config));
    let runner = PipelineRunner::new(backends, &config);

    // 4. Image
    let image = ImageInput::from_path(&cli.image)?;
    log::info!(
        "Narrating {} ({} bytes, .{})",
        cli.image.display(),
        image.len(),
        image.extension()
    );

    // 5. Pipeline, rendering events as they arrive
    let (event_tx, event_rx) = mpsc::channel::<PipelineEvent>(8);
    let quiet = cli.quiet;
    let printer = tokio::spawn(print_events(event_rx, quiet));

    let report = runner.run_with_events(&image, &event_tx).await;
    drop(event_tx);
    let printed = match printer.await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Progress printer stopped early: {e}");
            false
        }
    };

    // A failure is normally printed from its `Failed` event.
    if let Some(failure) = report.failure {
        if !printed {
            eprintln!("Error: {failure}");
        }
        return Ok(ExitCode::FAILURE);
    }

    // 6. Audio
    match report.audio {
        Some(AudioResult::Audio(bytes)) => match &cli.out {
            Some(path) => {
                std::fs::write(path, &bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Saved {} ({} bytes)", path.display(), bytes.len());
            }
            None => println!("Audio ready ({} bytes); pass --out to save it", bytes.len()),
        },
        _ => log::warn!("Could not generate audio. Check your HF token, network, or try again."),
    }

    Ok(ExitCode::SUCCESS)
}

/// Print stage results to stdout in arrival order.
async fn print_events(mut rx: mpsc::Receiver<PipelineEvent>, quiet: bool) {
    while let Some(event) = rx.recv().await {
        match event {
            PipelineEvent::Started(stage) => {
                if !quiet {
                    eprintln!("{}", stage.running_state().label());
                }
            }
            PipelineEvent::CaptionReady(text) => {
                println!("Caption: {}", or_empty(&text));
            }
            PipelineEvent::StoryReady(text) => {
                println!("Story: {}", or_empty(&text));
            }
            PipelineEvent::AudioReady(_) => {}
            PipelineEvent::Failed { stage, message } => {
                let what = match stage {
                    Stage::Caption => "generating caption",
                    Stage::Story => "generating story",
                    Stage::Speech => "generating speech",
                };
                eprintln!("Error {what}: {message}");
            }
        }
    }
}

fn or_empty(text: &str) -> &str {
    if text.is_empty() {
        "(empty)"
    } else {
        text
    }
}
