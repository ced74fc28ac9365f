//! Tool checks and config initialization.

use std::path::Path;

use crate::config::{self, Config};
use crate::tools::{self, Tool};

use super::{print_install_instructions, tool_override};

/// Check if yt-dlp and ffmpeg are installed
pub fn cmd_check_tools(config: &Config) -> anyhow::Result<()> {
    println!("Checking external tools...\n");

    let mut missing = 0;
    for tool in [Tool::YtDlp, Tool::Ffmpeg] {
        match tools::locate(tool, tool_override(config, tool)) {
            Some(path) => {
                let version = tools::version(tool, &path).unwrap_or_else(|| "unknown version".to_string());
                println!("✓ {}: {} ({})", tool, version, path.display());
            }
            None => {
                println!("✗ {}: NOT FOUND", tool);
                print_install_instructions(tool);
                missing += 1;
            }
        }
    }

    println!();
    match config::config_path() {
        Some(path) if path.exists() => println!("Config: {}", path.display()),
        Some(path) => println!("Config: {} (not created, using defaults)", path.display()),
        None => println!("Config: no config directory on this platform"),
    }

    if missing > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Write the current settings to a config file unless one exists
pub fn cmd_init_config(explicit: Option<&Path>, config: &Config) -> anyhow::Result<()> {
    let existing = explicit
        .map(Path::to_path_buf)
        .or_else(config::config_path)
        .filter(|p| p.exists());
    if let Some(path) = existing {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    let path = match explicit {
        Some(path) => {
            config::save_to(config, path)?;
            path.to_path_buf()
        }
        None => config::save(config)?,
    };
    println!("Wrote default config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_config_writes_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        cmd_init_config(Some(&path), &Config::default()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[cover]"));

        // A second run leaves the file alone
        std::fs::write(&path, "# edited\n").unwrap();
        cmd_init_config(Some(&path), &Config::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited\n");
    }
}
