//! Test utilities and fixtures for mp3-ripper tests.
//!
//! Provides a fake [`Transcoder`] that writes plain-text files describing
//! what it was asked to do, plus helpers for building throwaway album
//! folders.
//!
//! # Example
//!
//! ```ignore
//! let (_temp, dir) = album_dir(&[("X.mp3", "audio"), ("X.jpg", "art")]);
//! Embedder::new(FakeTranscoder::default(), EmbedOptions::default()).embed_tree(&dir);
//! assert_eq!(read(&dir.join("X.mp3")), "audio|title=X|artist=|cover=cropped480:art");
//! ```

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Error, Result};
use crate::transcoder::{TrackTags, Transcoder};

/// Transcoder stand-in.
///
/// `crop_cover` writes `cropped<size>:<source contents>`; `write_track`
/// writes `<audio contents>|title=<t>|artist=<a>|cover=<cover contents>`.
#[derive(Debug, Default)]
pub struct FakeTranscoder {
    /// Make `crop_cover` fail without writing anything
    pub fail_crop: bool,
    /// Make `write_track` fail without writing anything
    pub fail_write: bool,
    /// Make `write_track` "succeed" but leave an empty file
    pub empty_output: bool,
    /// Titles passed to `write_track`, in call order
    pub(crate) titles: RefCell<Vec<String>>,
}

impl FakeTranscoder {
    pub fn written_titles(&self) -> Vec<String> {
        self.titles.borrow().clone()
    }

    fn failure(what: &str) -> Error {
        Error::ToolFailed {
            command: format!("fake {}", what),
            status: "exit status: 1".to_string(),
            message: "simulated failure".to_string(),
        }
    }
}

impl Transcoder for FakeTranscoder {
    fn crop_cover(&self, source: &Path, dest: &Path, size: u32) -> Result<()> {
        if self.fail_crop {
            return Err(Self::failure("crop"));
        }
        let art = std::fs::read_to_string(source)?;
        std::fs::write(dest, format!("cropped{}:{}", size, art))?;
        Ok(())
    }

    fn write_track(
        &self,
        audio: &Path,
        cover: Option<&Path>,
        tags: &TrackTags,
        dest: &Path,
    ) -> Result<()> {
        self.titles.borrow_mut().push(tags.title.clone());
        if self.fail_write {
            return Err(Self::failure("write"));
        }
        if self.empty_output {
            std::fs::write(dest, b"")?;
            return Ok(());
        }

        let audio_data = std::fs::read_to_string(audio)?;
        let cover_data = match cover {
            Some(path) => std::fs::read_to_string(path)?,
            None => String::new(),
        };
        std::fs::write(
            dest,
            format!(
                "{}|title={}|artist={}|cover={}",
                audio_data,
                tags.title,
                tags.artist.as_deref().unwrap_or(""),
                cover_data
            ),
        )?;
        Ok(())
    }
}

/// Creates `<tempdir>/Album` populated with `(name, contents)` files.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn album_dir(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp = tempfile::tempdir().expect("Failed to create temp directory");
    let dir = temp.path().join("Album");
    std::fs::create_dir(&dir).expect("Failed to create album directory");

    for (name, contents) in files {
        std::fs::write(dir.join(name), contents).expect("Failed to write fixture file");
    }

    (temp, dir)
}

/// Sorted names of the files directly inside `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Read a fixture file as text
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("Failed to read file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_dir_creates_files() {
        let (_temp, dir) = album_dir(&[("a.mp3", "x"), ("a.jpg", "y")]);
        assert!(dir.ends_with("Album"));
        assert_eq!(file_names(&dir), vec!["a.jpg", "a.mp3"]);
        assert_eq!(read(&dir.join("a.mp3")), "x");
    }

    #[test]
    fn test_fake_records_titles_even_when_failing() {
        let (_temp, dir) = album_dir(&[("a.mp3", "x")]);
        let fake = FakeTranscoder {
            fail_write: true,
            ..Default::default()
        };
        let tags = TrackTags {
            title: "a".to_string(),
            artist: None,
        };

        assert!(fake.write_track(&dir.join("a.mp3"), None, &tags, &dir.join("out.mp3")).is_err());
        assert_eq!(fake.written_titles(), vec!["a"]);
        assert!(!dir.join("out.mp3").exists());
    }
}
