//! Embedding and cleanup commands.

use std::path::Path;

use crate::config::Config;
use crate::cover::{self, MatchPolicy};
use crate::embed::{EmbedOptions, EmbedOutcome, EmbedReport, Embedder};
use crate::request::non_blank;
use crate::tools::Tool;
use crate::transcoder::{Ffmpeg, Transcoder};

use super::require_tool_or_exit;

/// Embed covers and tags into an existing folder
pub fn cmd_embed(
    path: &Path,
    artist: Option<&str>,
    policy: MatchPolicy,
    keep_artwork: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let ffmpeg = require_tool_or_exit(config, Tool::Ffmpeg);

    if !path.is_dir() {
        anyhow::bail!("Not a directory: {}", path.display());
    }

    let options = EmbedOptions {
        album_artist: non_blank(artist.map(String::from)),
        policy,
        cover_size: config.cover.size,
    };
    run_embed(path, Ffmpeg::new(ffmpeg), options);

    if !keep_artwork {
        run_clean(path);
    }
    Ok(())
}

/// Remove leftover artwork
pub fn cmd_clean(path: &Path) -> anyhow::Result<()> {
    run_clean(path);
    Ok(())
}

/// Embed over `dest` and print one line per audio file
pub(crate) fn run_embed<T: Transcoder>(dest: &Path, transcoder: T, options: EmbedOptions) -> EmbedReport {
    println!("\n*** Embedding covers / metadata in {}", dest.display());

    let report = Embedder::new(transcoder, options).embed_tree(dest);
    print_report(&report);
    report
}

/// Sweep `.jpg` files under `dest` and print the count
pub(crate) fn run_clean(dest: &Path) -> usize {
    println!("\n*** Removing JPG files in {}", dest.display());
    let removed = cover::delete_image_files(dest);
    println!("🗑️ Removed {} JPG file(s)", removed);
    removed
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_report(report: &EmbedReport) {
    if report.is_empty() {
        println!("No MP3s found for embedding/metadata updates");
        return;
    }

    for file in &report.files {
        let name = file_name(&file.audio);
        match &file.outcome {
            EmbedOutcome::Cover { art } => {
                println!("[embed] cover + title/artist updated → {} (art: {})", name, file_name(art))
            }
            EmbedOutcome::MetadataOnly => println!("[embed] title/artist updated (no art) → {}", name),
            EmbedOutcome::Failed { reason } => println!("[embed] ✗ unchanged → {} ({})", name, reason),
        }
    }

    println!(
        "✅ Embedding complete: {} with cover, {} tags only, {} failed",
        report.covers(),
        report.metadata_only(),
        report.failures()
    );
    if !report.removed_art.is_empty() {
        println!("🗑️ Removed {} used artwork file(s)", report.removed_art.len());
    }
}
