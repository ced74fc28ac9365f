//! Pairing loose artwork files with audio files.
//!
//! The downloader leaves a thumbnail next to every track it writes. This
//! module decides which image belongs to which audio file:
//!
//! 1. **Strict-then-fallback** (default) - an image with the same base name,
//!    otherwise any image of the directory nobody has claimed yet
//! 2. **Fixed names** - `<base>.jpg`, `<base>.png`, `cover.jpg`, `cover.png`
//!
//! Matching is scoped to one directory: a [`CoverMatcher`] is built per
//! [`DirectoryGroup`] and dropped with it, so "used" images never leak
//! across folders.

mod cleanup;
mod scan;

pub use cleanup::delete_image_files;
pub use scan::{DirectoryGroup, directory_groups};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Audio extensions handled by the embedder (lowercase)
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3"];

/// Artwork extensions considered as candidates (lowercase)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Shared artwork names tried by [`MatchPolicy::FixedNames`] after the track's own
const SHARED_COVER_NAMES: &[&str] = &["cover.jpg", "cover.png"];

/// How artwork files are paired with audio files
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// Same-named image first, then any unused image of the folder
    #[default]
    StrictThenFallback,
    /// `<base>.jpg`, `<base>.png`, `cover.jpg`, `cover.png`, in that order
    FixedNames,
}

/// Name prefix of in-flight temp files written next to the audio
pub const TEMP_PREFIX: &str = ".mp3-ripper-";

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    let in_flight = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(TEMP_PREFIX));
    if in_flight {
        return false;
    }

    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Check if a path is an audio file by extension (temp outputs excluded)
pub fn is_audio_file(path: &Path) -> bool {
    has_extension(path, AUDIO_EXTENSIONS)
}

/// Check if a path is an artwork file by extension (temp outputs excluded)
pub fn is_image_file(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS)
}

/// File name without its extension
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Artwork selection for the audio files of one directory.
pub struct CoverMatcher<'a> {
    policy: MatchPolicy,
    images: &'a [PathBuf],
    used: HashSet<&'a Path>,
}

impl<'a> CoverMatcher<'a> {
    /// `images` must belong to a single directory, in sorted order.
    pub fn new(policy: MatchPolicy, images: &'a [PathBuf]) -> Self {
        Self {
            policy,
            images,
            used: HashSet::new(),
        }
    }

    /// Pick the artwork for `audio`, or `None` when nothing qualifies.
    pub fn select(&mut self, audio: &Path) -> Option<&'a Path> {
        match self.policy {
            MatchPolicy::StrictThenFallback => self.select_strict(audio),
            MatchPolicy::FixedNames => self.select_fixed(audio),
        }
    }

    fn select_strict(&mut self, audio: &Path) -> Option<&'a Path> {
        let base = base_name(audio);
        let images = self.images;

        let exact = images
            .iter()
            .map(PathBuf::as_path)
            .find(|img| !self.used.contains(img) && base_name(img) == base);

        let chosen = match exact {
            Some(img) => {
                tracing::debug!("Exact artwork match for {:?}: {:?}", audio, img);
                img
            }
            None => {
                let img = images
                    .iter()
                    .map(PathBuf::as_path)
                    .find(|img| !self.used.contains(img))?;
                tracing::debug!("Fallback artwork for {:?}: {:?}", audio, img);
                img
            }
        };

        self.used.insert(chosen);
        Some(chosen)
    }

    fn select_fixed(&self, audio: &Path) -> Option<&'a Path> {
        let base = base_name(audio);
        let own = [format!("{}.jpg", base), format!("{}.png", base)];

        own.iter()
            .map(String::as_str)
            .chain(SHARED_COVER_NAMES.iter().copied())
            .find_map(|name| {
                self.images
                    .iter()
                    .find(|img| img.file_name().is_some_and(|n| n == name))
                    .map(PathBuf::as_path)
            })
    }
}


/// Property-based tests using proptest
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Small alphabet so exact matches actually happen
    fn stem() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-d]{1,2}").unwrap()
    }

    fn sorted_unique(names: Vec<String>, ext: &str) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = names
            .into_iter()
            .map(|n| PathBuf::from("/dir").join(format!("{}.{}", n, ext)))
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }

    proptest! {
        /// Each image is handed out at most once per directory
        #[test]
        fn strict_assigns_each_image_at_most_once(
            audio in prop::collection::vec(stem(), 0..8),
            images in prop::collection::vec(stem(), 0..8),
        ) {
            let audio = sorted_unique(audio, "mp3");
            let images = sorted_unique(images, "jpg");
            let mut matcher = CoverMatcher::new(MatchPolicy::StrictThenFallback, &images);

            let assigned: Vec<&Path> = audio.iter().filter_map(|a| matcher.select(a)).collect();
            let unique: HashSet<&Path> = assigned.iter().copied().collect();

            prop_assert_eq!(assigned.len(), unique.len());
            prop_assert_eq!(assigned.len(), audio.len().min(images.len()));
        }

        /// An audio file with a same-named image always gets it
        #[test]
        fn strict_exact_match_is_never_stolen(
            audio in prop::collection::vec(stem(), 1..8),
            extra in prop::collection::vec(stem(), 0..4),
        ) {
            let audio = sorted_unique(audio, "mp3");
            let mut stems: Vec<String> = audio.iter().map(|a| base_name(a)).collect();
            stems.extend(extra);
            let images = sorted_unique(stems, "jpg");
            let mut matcher = CoverMatcher::new(MatchPolicy::StrictThenFallback, &images);

            for a in &audio {
                let chosen = matcher.select(a);
                prop_assert!(chosen.is_some());
                prop_assert_eq!(base_name(chosen.unwrap()), base_name(a));
            }
        }
    }
}
