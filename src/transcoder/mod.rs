//! FFmpeg invocations for cover cropping and tag rewriting.
//!
//! Audio is never re-encoded: every remux uses `-c copy` and only adds an
//! attached picture stream and ID3v2.3 tags.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::tools::ToolCommand;

/// Tags written to every processed track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackTags {
    /// Track title (the file's base name)
    pub title: String,
    /// Album artist override; `None` keeps the downloader's artist
    pub artist: Option<String>,
}

/// Seam between the embedder and the external transcoder.
///
/// Production code uses [`Ffmpeg`]; tests substitute a fake that writes
/// inspectable files.
pub trait Transcoder {
    /// Write a square, centered crop of `source` scaled to `size`×`size` into `dest`.
    fn crop_cover(&self, source: &Path, dest: &Path, size: u32) -> Result<()>;

    /// Copy `audio` into `dest` with new tags and, if given, `cover` attached.
    fn write_track(
        &self,
        audio: &Path,
        cover: Option<&Path>,
        tags: &TrackTags,
        dest: &Path,
    ) -> Result<()>;
}

/// The `ffmpeg` binary
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn base_command(&self) -> ToolCommand {
        ToolCommand::new(&self.program).args(["-hide_banner", "-loglevel", "error", "-y"])
    }

    /// `ffmpeg -i <art> -vf crop=...,scale=S:S -q:v 2 <dest>`
    pub fn crop_command(&self, source: &Path, dest: &Path, size: u32) -> ToolCommand {
        // crop without x/y offsets centers the square
        let filter = format!("crop='min(iw,ih)':'min(iw,ih)',scale={size}:{size}");

        self.base_command()
            .arg("-i")
            .arg(source)
            .args(["-vf".to_string(), filter])
            .args(["-q:v", "2"])
            .arg(dest)
    }

    /// Remux command: audio copy, optional attached picture, title/artist tags
    pub fn write_command(
        &self,
        audio: &Path,
        cover: Option<&Path>,
        tags: &TrackTags,
        dest: &Path,
    ) -> ToolCommand {
        let mut cmd = self.base_command().arg("-i").arg(audio);

        cmd = match cover {
            Some(image) => cmd
                .arg("-i")
                .arg(image)
                .args(["-map", "0:a", "-map", "1:v:0", "-c", "copy"])
                .args(["-id3v2_version", "3"])
                .args(["-metadata:s:v", "title=Album cover"])
                .args(["-metadata:s:v", "comment=Cover (front)"]),
            None => cmd.args(["-c", "copy", "-id3v2_version", "3"]),
        };

        if let Some(artist) = &tags.artist {
            cmd = cmd.arg("-metadata").arg(format!("artist={}", artist));
        }

        cmd.arg("-metadata")
            .arg(format!("title={}", tags.title))
            .arg(dest)
    }
}

impl Transcoder for Ffmpeg {
    fn crop_cover(&self, source: &Path, dest: &Path, size: u32) -> Result<()> {
        self.crop_command(source, dest, size).run_captured()
    }

    fn write_track(
        &self,
        audio: &Path,
        cover: Option<&Path>,
        tags: &TrackTags,
        dest: &Path,
    ) -> Result<()> {
        self.write_command(audio, cover, tags, dest).run_captured()
    }
}
