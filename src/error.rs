//! Application-wide error types.
//!
//! Library modules return [`Error`] via `thiserror`, while the CLI layer and
//! `main` use `anyhow` for convenient propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level error enum for tool, filesystem and input failures
//! - [`crate::config::ConfigError`]: Config persistence errors
//!
//! # Example
//!
//! ```ignore
//! use mp3_ripper::error::{Error, Result};
//!
//! fn replace(tmp: &Path, audio: &Path) -> Result<()> {
//!     std::fs::rename(tmp, audio)?; // IO errors auto-convert
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required external binary could not be found
    #[error("Missing required tool: {0}")]
    MissingTool(String),

    /// The external binary could not be started at all
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external binary ran but reported failure
    #[error("`{command}` exited with {status}: {message}")]
    ToolFailed {
        command: String,
        status: String,
        message: String,
    },

    /// A tool reported success but left no usable output behind
    #[error("No output produced at {0}")]
    MissingOutput(PathBuf),

    /// Interactive or piped input could not be obtained
    #[error("Input error: {0}")]
    Input(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a missing tool error.
    pub fn missing_tool(name: impl Into<String>) -> Self {
        Self::MissingTool(name.into())
    }

    /// Create a missing output error.
    pub fn missing_output(path: impl Into<PathBuf>) -> Self {
        Self::MissingOutput(path.into())
    }

    /// Create an input error.
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}
