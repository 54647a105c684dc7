use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while building, loading or saving a feature store.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a model failed.
    #[error("io error while processing {path:?}: {source}")]
    Io {
        /// Underlying error returned by the standard library.
        source: io::Error,
        /// File being processed, if the failure is tied to one.
        path: Option<PathBuf>,
    },
    /// Malformed model text.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number in the model text.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },
    /// Invalid parameter or driver input.
    #[error("{0}")]
    InvalidInput(String),
}

impl Error {
    /// Attach an optional path to an IO error.
    pub fn io(source: io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { source, path }
    }

    pub(crate) fn parse<M: Into<String>>(line: usize, message: M) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn invalid<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<io::Error> for Error {
    fn from(source: io::Error) -> Self {
        Self::Io { source, path: None }
    }
}
