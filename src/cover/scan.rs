//! Walk an album tree one directory at a time.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{is_audio_file, is_image_file};

/// The audio and artwork files directly inside one directory (sorted)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryGroup {
    pub dir: PathBuf,
    pub audio: Vec<PathBuf>,
    pub images: Vec<PathBuf>,
}

impl DirectoryGroup {
    /// Read the direct children of `dir`
    pub fn read(dir: &Path) -> std::io::Result<Self> {
        let mut audio = Vec::new();
        let mut images = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let path = entry.path();
            if is_audio_file(&path) {
                audio.push(path);
            } else if is_image_file(&path) {
                images.push(path);
            }
        }

        audio.sort();
        images.sort();

        Ok(Self {
            dir: dir.to_path_buf(),
            audio,
            images,
        })
    }
}

/// Lazily yield a [`DirectoryGroup`] for `root` and every directory below it.
///
/// Directories are visited depth-first in file-name order. Each directory is
/// listed only when the iterator reaches it. Unreadable directories are
/// logged and skipped.
pub fn directory_groups(root: &Path) -> impl Iterator<Item = DirectoryGroup> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable path: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_dir())
        .filter_map(|e| match DirectoryGroup::read(e.path()) {
            Ok(group) => Some(group),
            Err(err) => {
                tracing::warn!("Failed to list {:?}: {}", e.path(), err);
                None
            }
        })
}
