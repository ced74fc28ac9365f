//! What to rip and where.
//!
//! Two adapters produce the same [`RipRequest`]: command-line arguments
//! ([`RequestDraft::into_request`]) and the interactive prompt
//! ([`prompt::Prompter::complete`]), which fills in whatever the arguments
//! left out.

pub mod prompt;

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

/// Everything a rip run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RipRequest {
    /// Folder name created under `base_dir`
    pub album: String,
    pub album_artist: Option<String>,
    /// Directory the album folder is created in
    pub base_dir: PathBuf,
    pub urls: Vec<String>,
    pub rate_limit: Option<String>,
}

impl RipRequest {
    /// `<base_dir>/<album>`
    pub fn album_dir(&self) -> PathBuf {
        self.base_dir.join(&self.album)
    }
}

/// Partial input gathered from arguments (and stdin)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDraft {
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub urls: Vec<String>,
    pub rate_limit: Option<String>,
}

/// Trimmed value, `None` when blank
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RequestDraft {
    pub fn new(
        album: Option<String>,
        album_artist: Option<String>,
        urls: Vec<String>,
        rate_limit: Option<String>,
    ) -> Self {
        Self {
            album: non_blank(album),
            album_artist: non_blank(album_artist),
            urls: urls
                .into_iter()
                .filter_map(|u| non_blank(Some(u)))
                .collect(),
            rate_limit: non_blank(rate_limit),
        }
    }

    /// Whether the prompt is needed to fill in the album or URLs
    pub fn is_complete(&self) -> bool {
        self.album.is_some() && !self.urls.is_empty()
    }

    /// Argument adapter: a request only when nothing required is missing
    pub fn into_request(self, base_dir: &Path) -> Option<RipRequest> {
        if !self.is_complete() {
            return None;
        }
        Some(RipRequest {
            album: self.album?,
            album_artist: self.album_artist,
            base_dir: base_dir.to_path_buf(),
            urls: self.urls,
            rate_limit: self.rate_limit,
        })
    }
}

/// One URL per line, trimmed, blank lines skipped
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Read a URL list from piped stdin; a terminal yields nothing.
pub fn read_urls_from_stdin() -> std::io::Result<Vec<String>> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(Vec::new());
    }
    let mut text = String::new();
    stdin.lock().read_to_string(&mut text)?;
    Ok(parse_url_list(&text))
}

// ============================================================================
// Home and destination resolution
// ============================================================================

/// Home directory of the invoking user.
///
/// Under `sudo`, `SUDO_USER` names the real user; their home is used so the
/// album does not end up in root's Desktop.
pub fn resolve_home() -> Option<PathBuf> {
    if let Ok(user) = std::env::var("SUDO_USER")
        && !user.is_empty()
        && user != "root"
        && let Some(home) = home_for_user(&user)
    {
        return Some(home);
    }
    dirs::home_dir()
}

#[cfg(unix)]
fn home_for_user(user: &str) -> Option<PathBuf> {
    let passwd = std::fs::read_to_string("/etc/passwd").ok()?;
    passwd_home(&passwd, user)
}

#[cfg(not(unix))]
fn home_for_user(_user: &str) -> Option<PathBuf> {
    None
}

/// Find `user`'s home directory in `/etc/passwd` contents
pub(crate) fn passwd_home(passwd: &str, user: &str) -> Option<PathBuf> {
    passwd
        .lines()
        .filter(|l| !l.starts_with('#'))
        .find_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();
            (fields.len() >= 7 && fields[0] == user && !fields[5].is_empty())
                .then(|| PathBuf::from(fields[5]))
        })
}

/// Default base directory: `<home>/Desktop`
pub fn default_base_dir() -> Option<PathBuf> {
    resolve_home().map(|home| home.join("Desktop"))
}

/// Expand a leading `~` and make the path absolute
pub fn expand_user_path(input: &str) -> PathBuf {
    expand_with_home(input, resolve_home().as_deref())
}

fn expand_with_home(input: &str, home: Option<&Path>) -> PathBuf {
    let input = input.trim();
    let expanded = match (input.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with('/') || rest.starts_with('\\') => {
            home.join(&rest[1..])
        }
        _ => PathBuf::from(input),
    };
    std::path::absolute(&expanded).unwrap_or(expanded)
}
