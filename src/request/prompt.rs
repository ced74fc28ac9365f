//! Interactive completion of a [`RequestDraft`].

use std::io::{BufRead, Write};
use std::path::Path;

use super::{RequestDraft, RipRequest, expand_user_path, non_blank};
use crate::error::{Error, Result};

/// Asks for missing request fields on `output`, reading answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one trimmed line; `None` at end of input
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        self.read_line()
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Fill in whatever `draft` is missing.
    ///
    /// The destination question is always asked; Enter keeps `default_dir`.
    pub fn complete(mut self, draft: RequestDraft, default_dir: &Path) -> Result<RipRequest> {
        writeln!(self.output, "===== Interactive Mode =====")?;

        let album = match draft.album {
            Some(album) => album,
            None => self.ask_album()?,
        };

        let album_artist = match draft.album_artist {
            Some(artist) => Some(artist),
            None => non_blank(self.ask("Enter album artist (optional): ")?),
        };

        let custom_dir = self.ask(&format!(
            "mp3-ripper will create album ({}) in {}. \
             Press Enter to accept or specify another directory instead: ",
            album,
            default_dir.display()
        ))?;
        let base_dir = match non_blank(custom_dir) {
            Some(dir) => expand_user_path(&dir),
            None => default_dir.to_path_buf(),
        };

        let mut urls = draft.urls;
        if urls.is_empty() {
            writeln!(self.output, "Enter video or playlist URLs (blank line to finish):")?;
            while let Some(line) = self.read_line()? {
                if line.is_empty() {
                    break;
                }
                urls.push(line);
            }
        }

        Ok(RipRequest {
            album,
            album_artist,
            base_dir,
            urls,
            rate_limit: draft.rate_limit,
        })
    }

    fn ask_album(&mut self) -> Result<String> {
        let mut question = "Enter desired album name: ";
        loop {
            match self.ask(question)? {
                Some(answer) if !answer.is_empty() => return Ok(answer),
                Some(_) => question = "Album name is required: ",
                None => return Err(Error::input("album name is required")),
            }
        }
    }
}
