//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `rip`: Download, embed and clean up (the default)
//! - `embed`: Embedding and cleanup on an existing folder
//! - `tools`: Tool checks and config initialization

mod embed;
mod rip;
mod tools;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::cover::MatchPolicy;
use crate::tools::Tool;

pub use embed::{cmd_clean, cmd_embed};
pub use rip::cmd_rip;
pub use tools::{cmd_check_tools, cmd_init_config};

/// Download audio + embed artwork
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub rip: RipArgs,

    /// Config file (default: OS config dir/mp3-ripper/config.toml)
    #[arg(long, env = "MP3_RIPPER_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

/// Arguments of the default download-and-embed run
#[derive(Args, Debug, Default, Clone)]
pub struct RipArgs {
    /// Folder name (created under the base directory, default ~/Desktop)
    #[arg(long)]
    pub album: Option<String>,

    /// Album artist (overrides track artists)
    #[arg(long)]
    pub artist: Option<String>,

    /// URL or playlist (repeatable)
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Download rate limit (e.g. 2M)
    #[arg(long)]
    pub rate: Option<String>,

    /// Read URLs from stdin, one per line
    #[arg(long)]
    pub stdin: bool,

    /// How artwork files are paired with tracks
    #[arg(long, value_enum)]
    pub policy: Option<MatchPolicy>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Embed covers and tags into an existing folder, then remove artwork
    Embed {
        /// Album folder to process
        path: PathBuf,
        /// Album artist (overrides track artists)
        #[arg(long)]
        artist: Option<String>,
        /// How artwork files are paired with tracks
        #[arg(long, value_enum)]
        policy: Option<MatchPolicy>,
        /// Keep leftover .jpg files
        #[arg(long)]
        keep_artwork: bool,
    },
    /// Remove leftover .jpg artwork from a folder tree
    Clean {
        /// Folder to sweep
        path: PathBuf,
    },
    /// Check that yt-dlp and ffmpeg are installed
    CheckTools,
    /// Write a default config file if none exists
    InitConfig,
}

/// Run the command selected on the command line.
pub fn run_command(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    match &cli.command {
        None => cmd_rip(&cli.rip, config),
        Some(Commands::Embed {
            path,
            artist,
            policy,
            keep_artwork,
        }) => cmd_embed(
            path,
            artist.as_deref(),
            policy.unwrap_or(config.cover.policy),
            *keep_artwork,
            config,
        ),
        Some(Commands::Clean { path }) => cmd_clean(path),
        Some(Commands::CheckTools) => cmd_check_tools(config),
        Some(Commands::InitConfig) => cmd_init_config(cli.config.as_deref(), config),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Configured override path for `tool`, if any
pub(crate) fn tool_override(config: &Config, tool: Tool) -> Option<&Path> {
    match tool {
        Tool::YtDlp => config.tools.yt_dlp.as_deref(),
        Tool::Ffmpeg => config.tools.ffmpeg.as_deref(),
    }
}

/// Locate `tool` or exit with status 1 and install instructions
pub(crate) fn require_tool_or_exit(config: &Config, tool: Tool) -> PathBuf {
    match crate::tools::require(tool, tool_override(config, tool)) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("❌ {}", e);
            print_install_instructions(tool);
            std::process::exit(1);
        }
    }
}

/// Print installation instructions for `tool`
pub(crate) fn print_install_instructions(tool: Tool) {
    eprintln!("Install {}:", tool);
    for line in tool.install_hint() {
        eprintln!("{}", line);
    }
}
