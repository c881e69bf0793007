//! Command-line interface for img2speech.

use clap::Parser;
use std::path::PathBuf;

/// Turn an image into a short spoken story
#[derive(Parser, Debug)]
#[command(name = "img2speech", version, about = "Image → Story → Speech")]
pub struct Cli {
    /// JPEG or PNG image to narrate
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// Write the synthesised WAV here
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter implied by `-q` / `-v`.
    pub fn log_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}
