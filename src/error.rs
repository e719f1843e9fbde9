//! Crate-level error type.
//!
//! Every failure is fatal for the run; [`ErrorKind`] lets callers tell the families apart
//! without matching on messages.

use thiserror::Error;

use crate::lower::LowerError;
use crate::source::SourceError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Lower(#[from] LowerError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The schema tree has a shape the lowering pass cannot express.
    UnsupportedSchemaShape,
    /// A provider could not be resolved to a usable schema.
    ProviderResolution,
    /// Reading or writing local files failed.
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Lower(_) => ErrorKind::UnsupportedSchemaShape,
            Error::Source(SourceError::Io { .. }) => ErrorKind::Io,
            Error::Source(_) => ErrorKind::ProviderResolution,
            Error::Io(_) | Error::Json(_) => ErrorKind::Io,
        }
    }
}

impl ErrorKind {
    /// Process exit status for this family of failure.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::UnsupportedSchemaShape => 2,
            ErrorKind::ProviderResolution => 3,
            ErrorKind::Io => 1,
        }
    }
}
