//! Error types for Pushkit
//!
//! Every error carries a stable, short error code (see [`Error::code`]) so
//! callers that only surface a code to the app layer can do so without
//! matching on variants.

use crate::fs::Directory;
use std::io::ErrorKind;
use thiserror::Error;

/// Result type alias using Pushkit's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Pushkit error types.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reported by a filesystem backend.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Path escapes its storage root or contains unsafe characters.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The backend has no base location for this storage root.
    #[error("storage root not mapped: {0}")]
    UnmappedDirectory(Directory),

    /// Invalid backend configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Writing a text file failed. Wraps the backend error and embeds its code.
    #[error("could not write the current package information file, error code: {code}")]
    Write {
        code: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap a backend failure from a text write.
    pub fn write(source: Error) -> Self {
        Self::Write {
            code: source.code(),
            source: Box::new(source),
        }
    }

    /// Stable error code for this error.
    ///
    /// I/O errors map to POSIX-style names by [`ErrorKind`].
    pub fn code(&self) -> String {
        match self {
            Error::Io(err) => io_error_code(err.kind()).to_string(),
            Error::InvalidPath(_) => "EINVAL".to_string(),
            Error::UnmappedDirectory(_) => "ENODEV".to_string(),
            Error::Config(_) => "ECONFIG".to_string(),
            Error::Write { code, .. } => code.clone(),
        }
    }

    /// True if this is an I/O not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(err) if err.kind() == ErrorKind::NotFound)
    }
}

fn io_error_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "ENOENT",
        ErrorKind::PermissionDenied => "EACCES",
        ErrorKind::AlreadyExists => "EEXIST",
        ErrorKind::InvalidData | ErrorKind::InvalidInput => "EINVAL",
        _ => "EIO",
    }
}
