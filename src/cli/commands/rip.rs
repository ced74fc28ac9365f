//! The default run: download, embed, clean up.

use anyhow::Context;
use std::io;

use crate::config::Config;
use crate::downloader::{DownloadOptions, Downloader, Ledger};
use crate::embed::EmbedOptions;
use crate::request::{self, RequestDraft, RipRequest, prompt::Prompter};
use crate::tools::Tool;
use crate::transcoder::Ffmpeg;

use super::embed::{run_clean, run_embed};
use super::{RipArgs, require_tool_or_exit};

/// Download every URL into the album folder, then embed covers and tags
pub fn cmd_rip(args: &RipArgs, config: &Config) -> anyhow::Result<()> {
    // Both tools are checked before any work is done
    let yt_dlp = require_tool_or_exit(config, Tool::YtDlp);
    let ffmpeg = require_tool_or_exit(config, Tool::Ffmpeg);

    let request = gather_request(args, config)?;

    let dest = request.album_dir();
    std::fs::create_dir_all(&dest)
        .with_context(|| format!("Failed to create album folder {}", dest.display()))?;
    let ledger = Ledger::open(&dest)?;

    print_summary(&request, &dest);
    if let Ok(count) = ledger.recorded()
        && count > 0
    {
        println!("Ledger: {} item(s) already downloaded", count);
    }

    let downloader = Downloader::new(
        yt_dlp,
        &dest,
        ledger,
        DownloadOptions {
            rate_limit: request.rate_limit.clone(),
            title_max_chars: config.download.title_max_chars,
        },
    );

    let mut failed = 0;
    for url in &request.urls {
        println!("\n>>> Downloading: {}", url);
        if let Err(e) = downloader.download(url) {
            tracing::warn!("Download reported errors for {}: {}", url, e);
            failed += 1;
        }
    }
    println!("\n✅ Downloads complete");
    if failed > 0 {
        println!("   ({} URL(s) reported errors, see log above)", failed);
    }

    let options = EmbedOptions {
        album_artist: request.album_artist.clone(),
        policy: args.policy.unwrap_or(config.cover.policy),
        cover_size: config.cover.size,
    };
    run_embed(&dest, Ffmpeg::new(ffmpeg), options);
    run_clean(&dest);

    println!("\n✨ Done → {}", dest.display());
    Ok(())
}

/// Build the request from arguments, prompting for anything missing
fn gather_request(args: &RipArgs, config: &Config) -> anyhow::Result<RipRequest> {
    let mut urls = args.urls.clone();
    if args.stdin {
        urls.extend(request::read_urls_from_stdin().context("Failed to read URLs from stdin")?);
    }

    let draft = RequestDraft::new(
        args.album.clone(),
        args.artist.clone(),
        urls,
        args.rate.clone().or_else(|| config.download.rate_limit.clone()),
    );

    let default_dir = match &config.library.base_dir {
        Some(dir) => dir.clone(),
        None => request::default_base_dir().context("Could not determine home directory")?,
    };

    if let Some(request) = draft.clone().into_request(&default_dir) {
        return Ok(request);
    }

    let stdin = io::stdin();
    let request = Prompter::new(stdin.lock(), io::stdout()).complete(draft, &default_dir)?;
    Ok(request)
}

fn print_summary(request: &RipRequest, dest: &std::path::Path) {
    println!("Album: {}", request.album);
    if let Some(artist) = &request.album_artist {
        println!("Artist: {}", artist);
    }
    println!("Folder: {}", dest.display());
    if let Some(rate) = &request.rate_limit {
        println!("Limit: {}", rate);
    }
}
