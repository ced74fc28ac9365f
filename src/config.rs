//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\mp3-ripper\config.toml
//! - macOS: ~/Library/Application Support/mp3-ripper/config.toml
//! - Linux: ~/.config/mp3-ripper/config.toml
//!
//! Every setting is optional. Command-line flags take precedence over
//! values loaded here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cover::MatchPolicy;

/// Default edge length (pixels) of embedded cover art
pub const DEFAULT_COVER_SIZE: u32 = 480;

/// Default cap on the characters kept from a downloaded title
pub const DEFAULT_TITLE_MAX_CHARS: usize = 128;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where album folders are created
    pub library: LibraryConfig,

    /// Downloader settings
    pub download: DownloadConfig,

    /// Cover matching and cropping
    pub cover: CoverConfig,

    /// External binary overrides
    pub tools: ToolsConfig,
}

/// Library location settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Base directory for album folders (default: ~/Desktop)
    pub base_dir: Option<PathBuf>,
}

/// Downloader settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Default transfer-rate cap passed to yt-dlp (e.g. "2M")
    pub rate_limit: Option<String>,

    /// Maximum characters kept from a track title in the file name
    pub title_max_chars: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            rate_limit: None,
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
        }
    }
}

/// Cover embedding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    /// Edge length of the square cover written into each file
    pub size: u32,

    /// How artwork files are paired with audio files
    pub policy: MatchPolicy,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_COVER_SIZE,
            policy: MatchPolicy::default(),
        }
    }
}

/// Paths to the external binaries (empty = search PATH)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub yt_dlp: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mp3-ripper"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location, or from `explicit` when given.
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load(explicit: Option<&Path>) -> Config {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => {
                tracing::warn!("Could not determine config directory, using defaults");
                return Config::default();
            }
        },
    };
    load_from(&path)
}

/// Load configuration from a specific file
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[library]"));
        assert!(toml.contains("[download]"));
        assert!(toml.contains("[cover]"));
        assert!(toml.contains("[tools]"));
        assert!(toml.contains("policy = \"strict-then-fallback\""));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[download]
rate_limit = "2M"

[cover]
policy = "fixed-names"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.download.rate_limit.as_deref(), Some("2M"));
        assert_eq!(config.cover.policy, MatchPolicy::FixedNames);

        // Other fields use defaults
        assert_eq!(config.download.title_max_chars, DEFAULT_TITLE_MAX_CHARS);
        assert_eq!(config.cover.size, DEFAULT_COVER_SIZE);
        assert!(config.library.base_dir.is_none());
        assert!(config.tools.ffmpeg.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.library.base_dir = Some(PathBuf::from("/music/rips"));
        config.cover.size = 600;
        save_to(&config, &path).unwrap();

        let loaded = load_from(&path);
        assert_eq!(loaded.library.base_dir, Some(PathBuf::from("/music/rips")));
        assert_eq!(loaded.cover.size, 600);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_unparsable_config_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "this is [not toml").unwrap();

        let config = load_from(&path);
        assert_eq!(config.cover.size, DEFAULT_COVER_SIZE);
    }

    #[test]
    fn test_missing_config_is_default() {
        let config = load(Some(Path::new("/nonexistent/mp3-ripper/config.toml")));
        assert_eq!(config.cover.policy, MatchPolicy::StrictThenFallback);
    }
}
