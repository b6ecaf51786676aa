//! Filesystem capability trait definitions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

use crate::error::Result;

/// Async filesystem capability provided by the host.
///
/// Every call addresses an entry by a storage root and a path relative to
/// that root. Text payloads travel as `String`; `encoding` selects how they
/// map to bytes, with `None` meaning base64 of the raw bytes.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Get entry metadata.
    async fn stat(&self, directory: Directory, path: &str) -> Result<Metadata>;

    /// Create a directory.
    ///
    /// With `recursive`, missing parents are created and an existing
    /// directory is not an error.
    async fn mkdir(&self, directory: Directory, path: &str, recursive: bool) -> Result<()>;

    /// Resolve an entry to an addressable location string.
    ///
    /// The entry does not need to exist.
    async fn get_uri(&self, directory: Directory, path: &str) -> Result<String>;

    /// Remove a directory, and its contents if `recursive`.
    async fn rmdir(&self, directory: Directory, path: &str, recursive: bool) -> Result<()>;

    /// Delete a single file.
    async fn delete_file(&self, directory: Directory, path: &str) -> Result<()>;

    /// Write a file, creating or truncating it.
    async fn write_file(
        &self,
        directory: Directory,
        path: &str,
        data: &str,
        encoding: Option<Encoding>,
    ) -> Result<()>;

    /// Read a file.
    async fn read_file(
        &self,
        directory: Directory,
        path: &str,
        encoding: Option<Encoding>,
    ) -> Result<String>;
}

/// Logical storage root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Directory {
    /// User-visible documents
    Documents,
    /// Application data, private to the app
    Data,
    /// Library directory (iOS)
    Library,
    /// Cache directory, may be purged by the OS
    Cache,
    /// App-specific external storage (Android)
    External,
    /// Shared external storage (Android)
    ExternalStorage,
}

impl Directory {
    /// All storage roots.
    pub const ALL: [Directory; 6] = [
        Directory::Documents,
        Directory::Data,
        Directory::Library,
        Directory::Cache,
        Directory::External,
        Directory::ExternalStorage,
    ];

    /// Host identifier, e.g. `DATA`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Directory::Documents => "DOCUMENTS",
            Directory::Data => "DATA",
            Directory::Library => "LIBRARY",
            Directory::Cache => "CACHE",
            Directory::External => "EXTERNAL",
            Directory::ExternalStorage => "EXTERNAL_STORAGE",
        }
    }

    /// Lowercase name, used for uri hosts and default on-disk layouts.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Directory::Documents => "documents",
            Directory::Data => "data",
            Directory::Library => "library",
            Directory::Cache => "cache",
            Directory::External => "external",
            Directory::ExternalStorage => "external_storage",
        }
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text encoding for file reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Utf8,
    Ascii,
    Utf16,
}

/// Reference to an entry: storage root plus relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathRef {
    pub directory: Directory,
    pub path: String,
}

impl PathRef {
    pub fn new(directory: Directory, path: impl Into<String>) -> Self {
        Self {
            directory,
            path: path.into(),
        }
    }
}

impl fmt::Display for PathRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.directory, self.path)
    }
}

/// Entry metadata.
#[derive(Debug, Clone)]
pub struct Metadata {
    /// Entry type
    pub file_type: FileType,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// Creation time
    pub created: SystemTime,
    /// Addressable location of the entry
    pub uri: String,
}

impl Metadata {
    pub(crate) fn directory(uri: String) -> Self {
        let now = SystemTime::now();
        Self {
            file_type: FileType::Directory,
            size: 0,
            modified: now,
            created: now,
            uri,
        }
    }

    pub(crate) fn file(size: u64, uri: String) -> Self {
        let now = SystemTime::now();
        Self {
            file_type: FileType::File,
            size,
            modified: now,
            created: now,
            uri,
        }
    }
}

/// Entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Regular file
    File,
    /// Directory
    Directory,
}

impl FileType {
    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// Constructors for the error shapes every backend shares.
pub mod fs_errors {
    use crate::error::Error;
    use std::io::{Error as IoError, ErrorKind};

    pub fn not_found() -> Error {
        IoError::new(ErrorKind::NotFound, "not found").into()
    }

    pub fn parent_not_found() -> Error {
        IoError::new(ErrorKind::NotFound, "parent directory not found").into()
    }

    pub fn is_a_directory() -> Error {
        IoError::other("is a directory").into()
    }

    pub fn not_a_directory() -> Error {
        IoError::other("not a directory").into()
    }

    pub fn directory_not_empty() -> Error {
        IoError::other("directory not empty").into()
    }

    pub fn already_exists(msg: &str) -> Error {
        IoError::new(ErrorKind::AlreadyExists, msg.to_string()).into()
    }
}
