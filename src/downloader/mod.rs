//! yt-dlp invocation and the download ledger.
//!
//! Each URL is handed to yt-dlp on its own. yt-dlp extracts MP3 audio,
//! writes a JPEG thumbnail next to every track, and records finished items in
//! the ledger so a rerun over the same URL list only fetches what is new.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_TITLE_MAX_CHARS;
use crate::error::{Result, ResultExt};
use crate::tools::ToolCommand;

/// Ledger file name inside the album folder
pub const LEDGER_FILE_NAME: &str = ".downloaded.txt";

/// Audio codec requested from yt-dlp
pub const AUDIO_FORMAT: &str = "mp3";

/// Thumbnail format requested from yt-dlp
pub const THUMBNAIL_FORMAT: &str = "jpg";

/// yt-dlp's download archive for one album folder
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Ensure `<dest>/.downloaded.txt` exists
    pub fn open(dest: &Path) -> Result<Self> {
        let path = dest.join(LEDGER_FILE_NAME);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(format!("creating ledger {}", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of items already recorded
    pub fn recorded(&self) -> Result<usize> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(format!("reading ledger {}", self.path.display()))?;
        Ok(contents.lines().filter(|l| !l.trim().is_empty()).count())
    }
}

/// Per-run downloader settings
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Transfer-rate cap such as "2M"
    pub rate_limit: Option<String>,
    /// Characters kept from the title in the file name
    pub title_max_chars: usize,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            rate_limit: None,
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
        }
    }
}

/// Output template: title with quote characters stripped, truncated
pub fn output_template(dest: &Path, max_chars: usize) -> String {
    format!(
        "{}/%(title,.|replace:'\"',''|replace:'＂',''|replace:'“',''|replace:'”','').{}s.%(ext)s",
        dest.display(),
        max_chars
    )
}

/// Downloads URLs into one album folder
#[derive(Debug, Clone)]
pub struct Downloader {
    program: PathBuf,
    dest: PathBuf,
    ledger: Ledger,
    options: DownloadOptions,
}

impl Downloader {
    pub fn new(
        program: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
        ledger: Ledger,
        options: DownloadOptions,
    ) -> Self {
        Self {
            program: program.into(),
            dest: dest.into(),
            ledger,
            options,
        }
    }

    /// Build the yt-dlp invocation for `url`
    pub fn command(&self, url: &str) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.program)
            .args(["-x", "--audio-format", AUDIO_FORMAT, "--audio-quality", "0"])
            .args(["--add-metadata", "--write-thumbnail"])
            .args(["--convert-thumbnails", THUMBNAIL_FORMAT])
            .args(["--no-embed-thumbnail", "--ignore-errors"])
            // Track numbers from playlist order
            .args(["--parse-metadata", "playlist_index:%(track_number)s"])
            .args(["--parse-metadata", "playlist_index:%(track)s"])
            .arg("--output")
            .arg(output_template(&self.dest, self.options.title_max_chars))
            .arg("--download-archive")
            .arg(self.ledger.path());

        if let Some(rate) = self.options.rate_limit.as_deref().filter(|r| !r.is_empty()) {
            cmd = cmd.args(["--limit-rate", rate]);
        }

        cmd.arg(url)
    }

    /// Download one URL (or playlist), streaming yt-dlp's own progress output
    pub fn download(&self, url: &str) -> Result<()> {
        self.command(url).run_inherited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn downloader(dest: &Path, rate: Option<&str>) -> Downloader {
        let ledger = Ledger::open(dest).unwrap();
        let options = DownloadOptions {
            rate_limit: rate.map(String::from),
            ..Default::default()
        };
        Downloader::new("yt-dlp", dest, ledger, options)
    }

    #[test]
    fn test_ledger_is_created_and_reused() {
        let temp = TempDir::new().unwrap();

        let ledger = Ledger::open(temp.path()).unwrap();
        assert!(ledger.path().ends_with(LEDGER_FILE_NAME));
        assert_eq!(ledger.recorded().unwrap(), 0);

        std::fs::write(ledger.path(), "youtube abc123\nyoutube def456\n\n").unwrap();

        // Opening again must not truncate
        let reopened = Ledger::open(temp.path()).unwrap();
        assert_eq!(reopened.recorded().unwrap(), 2);
    }

    #[test]
    fn test_ledger_in_missing_directory_fails() {
        let err = Ledger::open(Path::new("/nonexistent/album")).unwrap_err();
        assert!(err.to_string().contains("creating ledger"));
    }

    #[test]
    fn test_output_template() {
        let template = output_template(Path::new("/music/Album"), 128);
        assert!(template.starts_with("/music/Album/%(title,"));
        assert!(template.contains("replace:'“',''"));
        assert!(template.ends_with(").128s.%(ext)s"));
    }

    #[test]
    fn test_command_arguments() {
        let temp = TempDir::new().unwrap();
        let cmd = downloader(temp.path(), None).command("https://example.com/playlist?list=1");
        let args = cmd.args_lossy();

        assert!(cmd.to_string().starts_with("yt-dlp -x "));
        assert_eq!(args[0], "-x");
        assert!(args.windows(2).any(|w| w == ["--audio-format", "mp3"]));
        assert!(args.windows(2).any(|w| w == ["--convert-thumbnails", "jpg"]));
        assert!(args.contains(&"--no-embed-thumbnail".to_string()));
        assert!(args.contains(&"playlist_index:%(track_number)s".to_string()));

        let archive = temp.path().join(LEDGER_FILE_NAME);
        assert!(
            args.windows(2)
                .any(|w| w[0] == "--download-archive" && w[1] == archive.to_string_lossy())
        );
        assert!(!args.contains(&"--limit-rate".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("https://example.com/playlist?list=1"));
    }

    #[test]
    fn test_rate_limit_is_passed_through() {
        let temp = TempDir::new().unwrap();
        let args = downloader(temp.path(), Some("2M")).command("u").args_lossy();
        assert!(args.windows(2).any(|w| w == ["--limit-rate", "2M"]));
    }

    #[test]
    fn test_empty_rate_limit_is_ignored() {
        let temp = TempDir::new().unwrap();
        let args = downloader(temp.path(), Some("")).command("u").args_lossy();
        assert!(!args.contains(&"--limit-rate".to_string()));
    }
}
