//! Pushkit - filesystem helpers for hybrid-app update packages
//!
//! Wraps a host filesystem capability ([`FileSystem`]) with the small set of
//! operations an update client needs to stage packages under the
//! application data root: existence checks, directory cleaning, batch
//! deletes, and text file reads and writes.
//!
//! # Example
//!
//! ```rust
//! use pushkit::{Directory, FileUtil};
//!
//! #[tokio::main]
//! async fn main() -> pushkit::Result<()> {
//!     let util = FileUtil::builder().build();
//!
//!     let uri = util.clean_data_directory("updates/pending").await?;
//!     assert_eq!(uri, "memory://data/updates/pending");
//!
//!     util.write_string_to_data_file("{}", "updates/pending/app.json", true)
//!         .await?;
//!     assert!(util.file_exists(Directory::Data, "updates/pending/app.json").await);
//!     Ok(())
//! }
//! ```

mod error;
mod file_util;
mod fs;
mod logging_impl;

pub use async_trait::async_trait;
pub use error::{Error, Result};
pub use file_util::{DS_STORE, MACOSX_METADATA, normalize_ignore_list};
#[cfg(not(target_arch = "wasm32"))]
pub use fs::{DiskFs, DiskFsConfig};
pub use fs::{
    Directory, Encoding, FileSystem, FileType, InMemoryFs, Metadata, PathRef, fs_errors, path,
};
pub use logging_impl::{LogConfig, format_content_for_log, sanitize_for_log};

use std::sync::Arc;

/// Main entry point for Pushkit.
///
/// Convenience operations over one filesystem capability. Operations that
/// take no storage root work on the application data root
/// ([`Directory::Data`] unless configured otherwise).
pub struct FileUtil {
    fs: Arc<dyn FileSystem>,
    data_directory: Directory,
    log_config: LogConfig,
}

impl FileUtil {
    /// Create a `FileUtil` over the given capability with default settings.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self::builder().fs(fs).build()
    }

    /// Create a new FileUtilBuilder for customized configuration.
    pub fn builder() -> FileUtilBuilder {
        FileUtilBuilder::default()
    }

    /// The underlying filesystem capability.
    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// The storage root used for application data.
    pub fn data_directory(&self) -> Directory {
        self.data_directory
    }
}

/// Builder for customized FileUtil configuration.
#[derive(Default)]
pub struct FileUtilBuilder {
    fs: Option<Arc<dyn FileSystem>>,
    data_directory: Option<Directory>,
    log_config: Option<LogConfig>,
}

impl FileUtilBuilder {
    /// Set the filesystem capability. Defaults to a fresh [`InMemoryFs`].
    pub fn fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Set the storage root treated as application data.
    pub fn data_directory(mut self, directory: Directory) -> Self {
        self.data_directory = Some(directory);
        self
    }

    /// Set logging behavior.
    pub fn log_config(mut self, config: LogConfig) -> Self {
        self.log_config = Some(config);
        self
    }

    /// Build the FileUtil instance.
    pub fn build(self) -> FileUtil {
        FileUtil {
            fs: self.fs.unwrap_or_else(|| Arc::new(InMemoryFs::new())),
            data_directory: self.data_directory.unwrap_or(Directory::Data),
            log_config: self.log_config.unwrap_or_default(),
        }
    }
}
