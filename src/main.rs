//! mp3-ripper - download audio and embed cover art.
//!
//! Drives `yt-dlp` to fetch audio (plus thumbnails) from URLs into a named
//! album folder, then `ffmpeg` to attach a square-cropped cover and
//! normalized title/artist tags to every track.

pub mod cli;
pub mod config;
pub mod cover;
pub mod downloader;
pub mod embed;
pub mod error;
pub mod request;
#[cfg(test)]
pub mod test_utils;
pub mod tools;
pub mod transcoder;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mp3_ripper=info")))
        .init();

    let config = config::load(args.config.as_deref());

    cli::run_command(&args, &config)
}
