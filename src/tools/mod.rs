//! External tool discovery and invocation.
//!
//! Both collaborators (`yt-dlp` and `ffmpeg`) are plain command-line
//! programs. A candidate binary is accepted when running it with its
//! version flag succeeds, so a stale path in the config or a broken install
//! is treated the same as a missing one.
//!
//! Install:
//! - Windows: `winget install yt-dlp.yt-dlp Gyan.FFmpeg`
//! - macOS: `brew install yt-dlp ffmpeg`
//! - Linux: `apt install yt-dlp ffmpeg` or equivalent

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// The external programs this tool drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    YtDlp,
    Ffmpeg,
}

impl Tool {
    /// Binary name looked up on PATH
    pub fn binary(self) -> &'static str {
        match self {
            Tool::YtDlp => "yt-dlp",
            Tool::Ffmpeg => "ffmpeg",
        }
    }

    fn version_flag(self) -> &'static str {
        match self {
            Tool::YtDlp => "--version",
            Tool::Ffmpeg => "-version",
        }
    }

    /// One-line install instructions per platform
    pub fn install_hint(self) -> &'static [&'static str] {
        match self {
            Tool::YtDlp => &[
                "  Windows: winget install yt-dlp.yt-dlp",
                "  macOS:   brew install yt-dlp",
                "  Linux:   apt install yt-dlp (or pipx install yt-dlp)",
            ],
            Tool::Ffmpeg => &[
                "  Windows: winget install Gyan.FFmpeg",
                "  macOS:   brew install ffmpeg",
                "  Linux:   apt install ffmpeg",
            ],
        }
    }

    /// Windows install folders, per tool
    #[cfg(any(windows, test))]
    fn windows_dirs(self) -> &'static [&'static str] {
        match self {
            Tool::YtDlp => &[r"C:\Program Files\yt-dlp", r"C:\yt-dlp"],
            Tool::Ffmpeg => &[r"C:\Program Files\ffmpeg\bin", r"C:\ffmpeg\bin"],
        }
    }

    /// Fallback install locations checked after PATH
    fn common_locations(self) -> Vec<PathBuf> {
        #[cfg(windows)]
        let (name, mut locations): (String, Vec<PathBuf>) = (
            format!("{}.exe", self.binary()),
            self.windows_dirs().iter().map(PathBuf::from).collect(),
        );
        #[cfg(not(windows))]
        let (name, mut locations): (String, Vec<PathBuf>) = (
            self.binary().to_string(),
            ["/usr/bin", "/usr/local/bin", "/opt/homebrew/bin"]
                .iter()
                .map(PathBuf::from)
                .collect(),
        );

        // winget links on Windows, pipx installs elsewhere
        #[cfg(windows)]
        let user_dir = dirs::data_local_dir().map(|d| d.join("Microsoft").join("WinGet").join("Links"));
        #[cfg(not(windows))]
        let user_dir = dirs::home_dir().map(|d| d.join(".local").join("bin"));
        locations.extend(user_dir);

        locations.into_iter().map(|d| d.join(&name)).collect()
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Run `program <version flag>` and report whether it succeeded
fn responds(program: &Path, tool: Tool) -> bool {
    Command::new(program)
        .arg(tool.version_flag())
        .stdin(Stdio::null())
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Find a working binary for `tool`.
///
/// An explicit override is the only candidate when given; otherwise PATH is
/// tried first, then common install locations.
pub fn locate(tool: Tool, override_path: Option<&Path>) -> Option<PathBuf> {
    let candidates: Vec<PathBuf> = match override_path {
        Some(path) => vec![path.to_path_buf()],
        None => std::iter::once(PathBuf::from(tool.binary()))
            .chain(tool.common_locations())
            .collect(),
    };

    candidates.into_iter().find(|path| responds(path, tool))
}

/// Like [`locate`], but missing tools are an error
pub fn require(tool: Tool, override_path: Option<&Path>) -> Result<PathBuf> {
    locate(tool, override_path).ok_or_else(|| Error::missing_tool(tool.binary()))
}

/// Get the tool's version string (first line of its version output)
pub fn version(tool: Tool, program: &Path) -> Option<String> {
    Command::new(program)
        .arg(tool.version_flag())
        .stdin(Stdio::null())
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .next()
                .map(|line| line.trim().to_string())
        })
}

/// A fully built external command line.
///
/// Kept separate from [`std::process::Command`] so it can be inspected in
/// tests and echoed to the log exactly as it will run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments as lossy strings (handy for assertions)
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Run with captured output; a failure carries the last stderr line.
    pub fn run_captured(&self) -> Result<()> {
        let line = self.to_string();
        tracing::info!(">>> {}", line);

        let output = self
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                command: line.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(Error::ToolFailed {
            command: line,
            status: output.status.to_string(),
            message: stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("Unknown error")
                .trim()
                .to_string(),
        })
    }

    /// Run with the terminal attached so progress output stays visible.
    pub fn run_inherited(&self) -> Result<()> {
        let line = self.to_string();
        tracing::info!(">>> {}", line);

        let status = self
            .to_command()
            .status()
            .map_err(|source| Error::Spawn {
                command: line.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::ToolFailed {
                command: line,
                status: status.to_string(),
                message: "see output above".to_string(),
            })
        }
    }
}

/// Quote an argument for display if it would otherwise be ambiguous
fn display_arg(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("{:?}", arg)
    } else {
        arg.to_string()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", display_arg(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", display_arg(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display_quotes_spaces() {
        let cmd = ToolCommand::new("ffmpeg")
            .args(["-metadata:s:v", "title=Album cover"])
            .arg("out.mp3");

        assert_eq!(
            cmd.to_string(),
            r#"ffmpeg -metadata:s:v "title=Album cover" out.mp3"#
        );
    }

    #[test]
    fn test_command_display_quotes_empty_arg() {
        let cmd = ToolCommand::new("yt-dlp").arg("");
        assert_eq!(cmd.to_string(), r#"yt-dlp """#);
    }

    #[test]
    fn test_args_lossy_preserves_order() {
        let cmd = ToolCommand::new("ffmpeg").args(["-y", "-i"]).arg(Path::new("a.mp3"));
        assert_eq!(cmd.args_lossy(), vec!["-y", "-i", "a.mp3"]);
        assert!(cmd.to_string().starts_with("ffmpeg "));
    }

    #[test]
    fn test_locate_rejects_bogus_override() {
        let bogus = Path::new("/nonexistent/bin/ffmpeg");
        assert!(locate(Tool::Ffmpeg, Some(bogus)).is_none());

        let err = require(Tool::Ffmpeg, Some(bogus)).unwrap_err();
        assert!(matches!(err, Error::MissingTool(ref name) if name == "ffmpeg"));
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let cmd = ToolCommand::new("/nonexistent/bin/yt-dlp").arg("--version");
        let err = cmd.run_captured().unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/bin/yt-dlp --version"));
    }

    #[test]
    fn test_windows_dirs_are_per_tool() {
        let yt_dlp = Tool::YtDlp.windows_dirs();
        let ffmpeg = Tool::Ffmpeg.windows_dirs();

        assert!(yt_dlp.iter().all(|d| !ffmpeg.contains(d)));
        assert!(yt_dlp.iter().all(|d| d.contains("yt-dlp")));
        assert!(ffmpeg.iter().all(|d| d.contains("ffmpeg")));
    }

    #[test]
    fn test_common_locations_end_in_binary() {
        for tool in [Tool::YtDlp, Tool::Ffmpeg] {
            let locations = tool.common_locations();
            assert!(!locations.is_empty());
            assert!(locations.iter().all(|p| {
                p.file_stem().is_some_and(|s| s == tool.binary())
            }));
        }
    }

    #[test]
    fn test_tool_display_is_binary_name() {
        assert_eq!(Tool::YtDlp.to_string(), "yt-dlp");
        assert_eq!(Tool::Ffmpeg.to_string(), "ffmpeg");
        assert!(!Tool::Ffmpeg.install_hint().is_empty());
    }
}
