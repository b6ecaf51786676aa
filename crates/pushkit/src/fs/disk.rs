//! Host disk filesystem implementation.
//!
//! [`DiskFs`] maps each storage root to a base directory on the host disk and
//! serves the capability contract with `tokio::fs`. Paths are normalized
//! before they are joined onto the base, and the joined path is checked
//! against the canonical base after symlinks are resolved, so nothing outside
//! the configured roots is reachable through a relative path.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::encoding;
use super::path::normalize;
use super::traits::{Directory, Encoding, FileSystem, FileType, Metadata, fs_errors};
use crate::error::{Error, Result};

/// Storage root to base directory mapping for [`DiskFs`].
///
/// # Example
///
/// ```rust
/// use pushkit::{Directory, DiskFsConfig};
///
/// let config = DiskFsConfig::from_json_str(r#"{"roots": {"DATA": "/var/app/data"}}"#)?;
/// assert!(config.roots.contains_key(&Directory::Data));
/// # Ok::<(), pushkit::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskFsConfig {
    #[serde(default)]
    pub roots: BTreeMap<Directory, PathBuf>,
}

impl DiskFsConfig {
    /// Create an empty config. No roots are mapped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a storage root to a base directory.
    pub fn root(mut self, directory: Directory, path: impl Into<PathBuf>) -> Self {
        self.roots.insert(directory, path.into());
        self
    }

    /// Map every storage root to `base/<root name>`.
    pub fn under(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let roots = Directory::ALL
            .into_iter()
            .map(|dir| (dir, base.join(dir.dir_name())))
            .collect();
        Self { roots }
    }

    /// Parse a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a JSON config file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&text)
    }
}

/// Filesystem backed by directories on the host disk.
///
/// A mapped root's base directory is created the first time the root is
/// addressed, so every mapped root exists as an empty directory, as it does
/// in [`InMemoryFs`](super::InMemoryFs).
///
/// Symlinks inside a root are followed only while they stay inside it. An
/// operation whose target resolves outside the base directory fails with
/// [`Error::InvalidPath`].
pub struct DiskFs {
    config: DiskFsConfig,
}

impl DiskFs {
    pub fn new(config: DiskFsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiskFsConfig {
        &self.config
    }

    fn base(&self, directory: Directory) -> Result<&Path> {
        self.config
            .roots
            .get(&directory)
            .map(PathBuf::as_path)
            .ok_or(Error::UnmappedDirectory(directory))
    }

    /// Resolve to `(relative, absolute-on-disk)` paths.
    ///
    /// Creates the root's base directory if needed and rejects targets that
    /// a symlink carries outside of it.
    async fn resolve(&self, directory: Directory, path: &str) -> Result<(PathBuf, PathBuf)> {
        let base = self.base(directory)?;
        let rel = normalize(path)?;
        tokio::fs::create_dir_all(base).await?;
        let full = if rel.as_os_str().is_empty() {
            base.to_path_buf()
        } else {
            base.join(&rel)
        };
        Self::check_contained(base, &full, path).await?;
        Ok((rel, full))
    }

    /// The deepest existing ancestor of `full` (or `full` itself) must
    /// canonicalize to a path under the canonical base.
    async fn check_contained(base: &Path, full: &Path, path: &str) -> Result<()> {
        let root = tokio::fs::canonicalize(base).await?;
        let escapes = || {
            Error::InvalidPath(format!(
                "{}: resolves outside storage root",
                path.escape_debug()
            ))
        };

        let mut current = full.to_path_buf();
        loop {
            match tokio::fs::canonicalize(&current).await {
                Ok(real) if real.starts_with(&root) => return Ok(()),
                Ok(_) => return Err(escapes()),
                // Dangling symlink: writing through it would create its target
                Err(_) if tokio::fs::symlink_metadata(&current).await.is_ok() => {
                    return Err(escapes());
                }
                Err(_) => {
                    if !current.pop() {
                        return Err(escapes());
                    }
                }
            }
        }
    }

    async fn file_type(path: &Path) -> Option<FileType> {
        let meta = tokio::fs::metadata(path).await.ok()?;
        Some(if meta.is_dir() {
            FileType::Directory
        } else {
            FileType::File
        })
    }

    async fn check_parent(full: &Path) -> Result<()> {
        let Some(parent) = full.parent() else {
            return Ok(());
        };
        match Self::file_type(parent).await {
            Some(FileType::Directory) => Ok(()),
            Some(FileType::File) => Err(fs_errors::not_a_directory()),
            None => Err(fs_errors::parent_not_found()),
        }
    }

    fn file_uri(full: &Path) -> Result<String> {
        let absolute = if full.is_absolute() {
            full.to_path_buf()
        } else {
            std::env::current_dir()?.join(full)
        };
        url::Url::from_file_path(&absolute)
            .map(|u| u.to_string())
            .map_err(|_| Error::InvalidPath(absolute.display().to_string()))
    }
}

#[async_trait]
impl FileSystem for DiskFs {
    async fn stat(&self, directory: Directory, path: &str) -> Result<Metadata> {
        let (_, full) = self.resolve(directory, path).await?;
        let meta = tokio::fs::metadata(&full).await?;

        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Ok(Metadata {
            file_type: if meta.is_dir() {
                FileType::Directory
            } else {
                FileType::File
            },
            size: if meta.is_dir() { 0 } else { meta.len() },
            modified,
            created: meta.created().unwrap_or(modified),
            uri: Self::file_uri(&full)?,
        })
    }

    async fn mkdir(&self, directory: Directory, path: &str, recursive: bool) -> Result<()> {
        let (rel, full) = self.resolve(directory, path).await?;

        match Self::file_type(&full).await {
            Some(FileType::Directory) if recursive => return Ok(()),
            Some(FileType::Directory) => {
                return Err(fs_errors::already_exists("directory exists"));
            }
            Some(FileType::File) => return Err(fs_errors::already_exists("file exists")),
            None => {}
        }

        if recursive {
            let base = self.base(directory)?;
            let mut current = base.to_path_buf();
            for component in rel.components() {
                current.push(component);
                if Self::file_type(&current).await == Some(FileType::File) {
                    return Err(fs_errors::already_exists("file exists"));
                }
            }
            tokio::fs::create_dir_all(&full).await?;
        } else {
            Self::check_parent(&full).await?;
            tokio::fs::create_dir(&full).await?;
        }

        Ok(())
    }

    async fn get_uri(&self, directory: Directory, path: &str) -> Result<String> {
        let (_, full) = self.resolve(directory, path).await?;
        Self::file_uri(&full)
    }

    async fn rmdir(&self, directory: Directory, path: &str, recursive: bool) -> Result<()> {
        let (rel, full) = self.resolve(directory, path).await?;

        let meta = tokio::fs::metadata(&full).await?;
        if !meta.is_dir() {
            return Err(fs_errors::not_a_directory());
        }

        let mut listing = tokio::fs::read_dir(&full).await?;
        if !recursive {
            if listing.next_entry().await?.is_some() {
                return Err(fs_errors::directory_not_empty());
            }
            if !rel.as_os_str().is_empty() {
                tokio::fs::remove_dir(&full).await?;
            }
            return Ok(());
        }

        if rel.as_os_str().is_empty() {
            // The storage root itself is emptied but never removed
            while let Some(entry) = listing.next_entry().await? {
                if entry.file_type().await?.is_dir() {
                    tokio::fs::remove_dir_all(entry.path()).await?;
                } else {
                    tokio::fs::remove_file(entry.path()).await?;
                }
            }
        } else {
            tokio::fs::remove_dir_all(&full).await?;
        }

        Ok(())
    }

    async fn delete_file(&self, directory: Directory, path: &str) -> Result<()> {
        let (_, full) = self.resolve(directory, path).await?;

        let meta = tokio::fs::metadata(&full).await?;
        if meta.is_dir() {
            return Err(fs_errors::is_a_directory());
        }
        tokio::fs::remove_file(&full).await?;
        Ok(())
    }

    async fn write_file(
        &self,
        directory: Directory,
        path: &str,
        data: &str,
        encoding: Option<Encoding>,
    ) -> Result<()> {
        let (rel, full) = self.resolve(directory, path).await?;
        if rel.as_os_str().is_empty() {
            return Err(fs_errors::is_a_directory());
        }
        let content = encoding::encode(data, encoding)?;

        Self::check_parent(&full).await?;
        if Self::file_type(&full).await == Some(FileType::Directory) {
            return Err(fs_errors::is_a_directory());
        }

        tokio::fs::write(&full, content).await?;
        Ok(())
    }

    async fn read_file(
        &self,
        directory: Directory,
        path: &str,
        encoding: Option<Encoding>,
    ) -> Result<String> {
        let (_, full) = self.resolve(directory, path).await?;

        if Self::file_type(&full).await == Some(FileType::Directory) {
            return Err(fs_errors::is_a_directory());
        }
        let content = tokio::fs::read(&full).await?;
        encoding::decode(content, encoding)
    }
}
