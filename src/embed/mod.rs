//! Cover and tag embedding over an album tree.
//!
//! For every audio file the embedder resolves artwork (see [`crate::cover`]),
//! crops it into a temp image, remuxes the track into a temp output and only
//! then swaps the output over the original. Temp files are [`TempPath`]s, so
//! they disappear on every exit path, including early errors.
//!
//! Under [`MatchPolicy::FixedNames`] artwork can be shared between tracks, so
//! consumed images are deleted once their directory is finished rather than
//! left for the JPEG sweep (which would miss `.png` candidates).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::config::DEFAULT_COVER_SIZE;
use crate::cover::{self, CoverMatcher, DirectoryGroup, MatchPolicy, TEMP_PREFIX};
use crate::error::{Error, Result, ResultExt};
use crate::transcoder::{TrackTags, Transcoder};

/// Settings for one embedding pass
#[derive(Debug, Clone)]
pub struct EmbedOptions {
    /// Overrides every track's artist when set
    pub album_artist: Option<String>,
    pub policy: MatchPolicy,
    /// Edge length of the square cover
    pub cover_size: u32,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            album_artist: None,
            policy: MatchPolicy::default(),
            cover_size: DEFAULT_COVER_SIZE,
        }
    }
}

/// What happened to one audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedOutcome {
    /// Cover attached and tags rewritten
    Cover { art: PathBuf },
    /// Tags rewritten, no cover (none found, or cropping failed)
    MetadataOnly,
    /// Original left untouched
    Failed { reason: String },
}

/// Result for a single audio file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub audio: PathBuf,
    /// Artwork selected for this file, if any
    pub art: Option<PathBuf>,
    pub outcome: EmbedOutcome,
}

/// Results for a whole tree
#[derive(Debug, Clone, Default)]
pub struct EmbedReport {
    pub files: Vec<FileReport>,
    /// Artwork deleted right after embedding (fixed-names policy only)
    pub removed_art: Vec<PathBuf>,
}

impl EmbedReport {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn covers(&self) -> usize {
        self.count(|o| matches!(o, EmbedOutcome::Cover { .. }))
    }

    pub fn metadata_only(&self) -> usize {
        self.count(|o| matches!(o, EmbedOutcome::MetadataOnly))
    }

    pub fn failures(&self) -> usize {
        self.count(|o| matches!(o, EmbedOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&EmbedOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }
}

/// Reserve a temp path in `dir` ending in `.{ext}`.
///
/// The file is created empty; the transcoder overwrites it.
fn temp_path_in(dir: &Path, ext: &str) -> Result<TempPath> {
    let file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(&format!(".{}", ext))
        .tempfile_in(dir)
        .with_context(format!("creating temp file in {}", dir.display()))?;
    Ok(file.into_temp_path())
}

/// Delete artwork that was embedded, keeping anything a failed file still needs.
///
/// Returns the paths actually removed; delete failures are logged and skipped.
fn remove_consumed_art(files: &[FileReport]) -> Vec<PathBuf> {
    let still_needed: BTreeSet<&Path> = files
        .iter()
        .filter(|f| matches!(f.outcome, EmbedOutcome::Failed { .. }))
        .filter_map(|f| f.art.as_deref())
        .collect();

    let consumed: BTreeSet<&Path> = files
        .iter()
        .filter_map(|f| match &f.outcome {
            EmbedOutcome::Cover { art } => Some(art.as_path()),
            _ => None,
        })
        .filter(|art| !still_needed.contains(art))
        .collect();

    consumed
        .into_iter()
        .filter_map(|art| match std::fs::remove_file(art) {
            Ok(()) => {
                tracing::debug!("Removed consumed artwork {:?}", art);
                Some(art.to_path_buf())
            }
            Err(e) => {
                tracing::warn!("Failed to remove {:?}: {}", art, e);
                None
            }
        })
        .collect()
}

/// The transcoder must have left a non-empty file behind
fn ensure_output(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(Error::missing_output(path)),
    }
}

/// Embeds covers and tags using a [`Transcoder`]
pub struct Embedder<T: Transcoder> {
    transcoder: T,
    options: EmbedOptions,
}

impl<T: Transcoder> Embedder<T> {
    pub fn new(transcoder: T, options: EmbedOptions) -> Self {
        Self {
            transcoder,
            options,
        }
    }

    /// Process every directory under `root`, one audio file at a time
    pub fn embed_tree(&self, root: &Path) -> EmbedReport {
        let mut report = EmbedReport::default();
        for group in cover::directory_groups(root) {
            let files = self.embed_group(&group);
            if self.options.policy == MatchPolicy::FixedNames {
                report.removed_art.extend(remove_consumed_art(&files));
            }
            report.files.extend(files);
        }
        report
    }

    /// Process the audio files of a single directory in sorted order
    pub fn embed_group(&self, group: &DirectoryGroup) -> Vec<FileReport> {
        if !group.audio.is_empty() {
            tracing::debug!(
                "Processing {} audio file(s), {} image(s) in {:?}",
                group.audio.len(),
                group.images.len(),
                group.dir
            );
        }
        let mut matcher = CoverMatcher::new(self.options.policy, &group.images);

        group
            .audio
            .iter()
            .map(|audio| {
                let art = matcher.select(audio);
                if art.is_none() {
                    tracing::info!("No artwork for {:?}, updating tags only", audio);
                }

                let outcome = match self.embed_file(audio, art) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::warn!("Leaving {:?} unchanged: {}", audio, e);
                        EmbedOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                };

                FileReport {
                    audio: audio.clone(),
                    art: art.map(Path::to_path_buf),
                    outcome,
                }
            })
            .collect()
    }

    /// Rewrite one audio file, attaching `art` when given.
    pub fn embed_file(&self, audio: &Path, art: Option<&Path>) -> Result<EmbedOutcome> {
        let dir = audio
            .parent()
            .ok_or_else(|| Error::input(format!("{} has no parent directory", audio.display())))?;

        let tags = TrackTags {
            title: cover::base_name(audio),
            artist: self.options.album_artist.clone(),
        };

        // Dropped at the end of this function, after the swap
        let cropped = match art {
            Some(art) => self.crop(dir, art),
            None => None,
        };

        let ext = audio
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or(crate::downloader::AUDIO_FORMAT);
        let output = temp_path_in(dir, ext)?;

        self.transcoder
            .write_track(audio, cropped.as_deref(), &tags, &output)?;
        ensure_output(&output)?;

        output
            .persist(audio)
            .map_err(|e| Error::Io(e.error))
            .with_context(format!("replacing {}", audio.display()))?;

        Ok(match (art, cropped) {
            (Some(art), Some(_)) => EmbedOutcome::Cover {
                art: art.to_path_buf(),
            },
            _ => EmbedOutcome::MetadataOnly,
        })
    }

    /// Crop `art` into a temp image; `None` (and a warning) if that fails
    fn crop(&self, dir: &Path, art: &Path) -> Option<TempPath> {
        let result = temp_path_in(dir, "jpg").and_then(|cropped| {
            self.transcoder
                .crop_cover(art, &cropped, self.options.cover_size)?;
            ensure_output(&cropped)?;
            Ok(cropped)
        });

        match result {
            Ok(cropped) => Some(cropped),
            Err(e) => {
                tracing::warn!("Could not prepare artwork {:?}: {}", art, e);
                None
            }
        }
    }
}
