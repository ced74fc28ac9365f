//! Command-line interface for mp3-ripper.
//!
//! Without a subcommand the tool downloads, embeds and cleans up in one go;
//! the subcommands expose the later stages on their own.

mod commands;

pub use commands::{Cli, run_command};
