//! In-memory filesystem implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

use super::encoding;
use super::path::{normalize, to_slash};
use super::traits::{Directory, Encoding, FileSystem, Metadata, fs_errors};
use crate::error::Result;

/// In-memory filesystem.
///
/// Stores every storage root in one HashMap keyed by `(root, path)`. Each
/// root starts out as an empty directory. Uris take the form
/// `memory://<root>/<path>`.
pub struct InMemoryFs {
    entries: RwLock<HashMap<(Directory, PathBuf), FsEntry>>,
}

#[derive(Debug, Clone)]
enum FsEntry {
    File { content: Vec<u8>, metadata: Metadata },
    Directory { metadata: Metadata },
}

impl FsEntry {
    fn metadata(&self) -> &Metadata {
        match self {
            FsEntry::File { metadata, .. } | FsEntry::Directory { metadata } => metadata,
        }
    }
}

impl Default for InMemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFs {
    /// Create a new in-memory filesystem with every storage root present.
    pub fn new() -> Self {
        let mut entries = HashMap::new();

        for dir in Directory::ALL {
            entries.insert(
                (dir, PathBuf::new()),
                FsEntry::Directory {
                    metadata: Metadata::directory(Self::uri(dir, Path::new(""))),
                },
            );
        }

        Self {
            entries: RwLock::new(entries),
        }
    }

    fn uri(directory: Directory, path: &Path) -> String {
        format!("memory://{}/{}", directory.dir_name(), to_slash(path))
    }

    /// Parent of a normalized path must be an existing directory.
    fn check_parent(
        entries: &HashMap<(Directory, PathBuf), FsEntry>,
        directory: Directory,
        path: &Path,
    ) -> Result<()> {
        let parent = path.parent().unwrap_or(Path::new(""));
        match entries.get(&(directory, parent.to_path_buf())) {
            Some(FsEntry::Directory { .. }) => Ok(()),
            Some(FsEntry::File { .. }) => Err(fs_errors::not_a_directory()),
            None => Err(fs_errors::parent_not_found()),
        }
    }
}

#[async_trait]
impl FileSystem for InMemoryFs {
    async fn stat(&self, directory: Directory, path: &str) -> Result<Metadata> {
        let path = normalize(path)?;
        let entries = self.entries.read().unwrap();

        entries
            .get(&(directory, path))
            .map(|entry| entry.metadata().clone())
            .ok_or_else(fs_errors::not_found)
    }

    async fn mkdir(&self, directory: Directory, path: &str, recursive: bool) -> Result<()> {
        let path = normalize(path)?;
        let mut entries = self.entries.write().unwrap();

        match entries.get(&(directory, path.clone())) {
            Some(FsEntry::Directory { .. }) if recursive => return Ok(()),
            Some(FsEntry::Directory { .. }) => {
                return Err(fs_errors::already_exists("directory exists"));
            }
            Some(FsEntry::File { .. }) => return Err(fs_errors::already_exists("file exists")),
            None => {}
        }

        if recursive {
            let mut current = PathBuf::new();
            for component in path.components() {
                current.push(component);
                match entries.get(&(directory, current.clone())) {
                    Some(FsEntry::Directory { .. }) => {}
                    Some(FsEntry::File { .. }) => {
                        return Err(fs_errors::already_exists("file exists"));
                    }
                    None => {
                        entries.insert(
                            (directory, current.clone()),
                            FsEntry::Directory {
                                metadata: Metadata::directory(Self::uri(directory, &current)),
                            },
                        );
                    }
                }
            }
        } else {
            Self::check_parent(&entries, directory, &path)?;
            let metadata = Metadata::directory(Self::uri(directory, &path));
            entries.insert((directory, path), FsEntry::Directory { metadata });
        }

        Ok(())
    }

    async fn get_uri(&self, directory: Directory, path: &str) -> Result<String> {
        let path = normalize(path)?;
        Ok(Self::uri(directory, &path))
    }

    async fn rmdir(&self, directory: Directory, path: &str, recursive: bool) -> Result<()> {
        let path = normalize(path)?;
        let mut entries = self.entries.write().unwrap();

        match entries.get(&(directory, path.clone())) {
            Some(FsEntry::Directory { .. }) => {}
            Some(FsEntry::File { .. }) => return Err(fs_errors::not_a_directory()),
            None => return Err(fs_errors::not_found()),
        }

        let children: Vec<(Directory, PathBuf)> = entries
            .keys()
            .filter(|(dir, p)| *dir == directory && p != &path && p.starts_with(&path))
            .cloned()
            .collect();

        if !children.is_empty() && !recursive {
            return Err(fs_errors::directory_not_empty());
        }

        for key in children {
            entries.remove(&key);
        }

        // The storage root itself is emptied but never removed
        if !path.as_os_str().is_empty() {
            entries.remove(&(directory, path));
        }

        Ok(())
    }

    async fn delete_file(&self, directory: Directory, path: &str) -> Result<()> {
        let path = normalize(path)?;
        let mut entries = self.entries.write().unwrap();

        match entries.get(&(directory, path.clone())) {
            Some(FsEntry::File { .. }) => {
                entries.remove(&(directory, path));
                Ok(())
            }
            Some(FsEntry::Directory { .. }) => Err(fs_errors::is_a_directory()),
            None => Err(fs_errors::not_found()),
        }
    }

    async fn write_file(
        &self,
        directory: Directory,
        path: &str,
        data: &str,
        encoding: Option<Encoding>,
    ) -> Result<()> {
        let path = normalize(path)?;
        if path.as_os_str().is_empty() {
            return Err(fs_errors::is_a_directory());
        }
        let content = encoding::encode(data, encoding)?;
        let mut entries = self.entries.write().unwrap();

        Self::check_parent(&entries, directory, &path)?;

        let mut metadata = Metadata::file(content.len() as u64, Self::uri(directory, &path));
        match entries.get(&(directory, path.clone())) {
            Some(FsEntry::Directory { .. }) => return Err(fs_errors::is_a_directory()),
            Some(FsEntry::File { metadata: old, .. }) => metadata.created = old.created,
            None => {}
        }
        metadata.modified = SystemTime::now();

        entries.insert((directory, path), FsEntry::File { content, metadata });
        Ok(())
    }

    async fn read_file(
        &self,
        directory: Directory,
        path: &str,
        encoding: Option<Encoding>,
    ) -> Result<String> {
        let path = normalize(path)?;
        let content = {
            let entries = self.entries.read().unwrap();
            match entries.get(&(directory, path)) {
                Some(FsEntry::File { content, .. }) => content.clone(),
                Some(FsEntry::Directory { .. }) => return Err(fs_errors::is_a_directory()),
                None => return Err(fs_errors::not_found()),
            }
        };

        encoding::decode(content, encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FileType;

    const UTF8: Option<Encoding> = Some(Encoding::Utf8);

    #[tokio::test]
    async fn test_write_and_read_file() {
        let fs = InMemoryFs::new();

        fs.write_file(Directory::Data, "test.txt", "hello world", UTF8)
            .await
            .unwrap();

        let content = fs.read_file(Directory::Data, "test.txt", UTF8).await.unwrap();
        assert_eq!(content, "hello world");
    }

    #[tokio::test]
    async fn test_roots_are_isolated() {
        let fs = InMemoryFs::new();

        fs.write_file(Directory::Data, "a.txt", "data", UTF8)
            .await
            .unwrap();

        assert!(fs.stat(Directory::Cache, "a.txt").await.is_err());
        assert!(fs.stat(Directory::Data, "a.txt").await.is_ok());
    }

    #[tokio::test]
    async fn test_write_requires_parent() {
        let fs = InMemoryFs::new();

        let err = fs
            .write_file(Directory::Data, "missing/file.txt", "x", UTF8)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_write_to_directory_fails() {
        let fs = InMemoryFs::new();
        fs.mkdir(Directory::Data, "dir", false).await.unwrap();

        let err = fs
            .write_file(Directory::Data, "dir", "x", UTF8)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("is a directory"));
    }

    #[tokio::test]
    async fn test_mkdir_recursive_creates_intermediates() {
        let fs = InMemoryFs::new();

        fs.mkdir(Directory::Data, "a/b/c", true).await.unwrap();

        for p in ["a", "a/b", "a/b/c"] {
            let meta = fs.stat(Directory::Data, p).await.unwrap();
            assert_eq!(meta.file_type, FileType::Directory);
        }
        // Existing directory is fine when recursive
        fs.mkdir(Directory::Data, "a/b/c", true).await.unwrap();
    }

    #[tokio::test]
    async fn test_mkdir_non_recursive_rules() {
        let fs = InMemoryFs::new();

        assert!(fs.mkdir(Directory::Data, "x/y", false).await.is_err());
        fs.mkdir(Directory::Data, "x", false).await.unwrap();
        let err = fs.mkdir(Directory::Data, "x", false).await.unwrap_err();
        assert_eq!(err.code(), "EEXIST");
    }

    #[tokio::test]
    async fn test_mkdir_through_file_fails() {
        let fs = InMemoryFs::new();
        fs.write_file(Directory::Data, "f", "x", UTF8).await.unwrap();

        let err = fs.mkdir(Directory::Data, "f/sub", true).await.unwrap_err();
        assert_eq!(err.code(), "EEXIST");
    }

    #[tokio::test]
    async fn test_rmdir() {
        let fs = InMemoryFs::new();
        fs.mkdir(Directory::Data, "pkg/www", true).await.unwrap();
        fs.write_file(Directory::Data, "pkg/www/index.html", "<html>", UTF8)
            .await
            .unwrap();

        let err = fs.rmdir(Directory::Data, "pkg", false).await.unwrap_err();
        assert!(err.to_string().contains("not empty"));

        fs.rmdir(Directory::Data, "pkg", true).await.unwrap();
        assert!(fs.stat(Directory::Data, "pkg").await.is_err());
        assert!(fs.stat(Directory::Data, "pkg/www/index.html").await.is_err());
    }

    #[tokio::test]
    async fn test_rmdir_keeps_sibling_with_shared_prefix() {
        let fs = InMemoryFs::new();
        fs.mkdir(Directory::Data, "pkg", false).await.unwrap();
        fs.mkdir(Directory::Data, "pkg2", false).await.unwrap();

        fs.rmdir(Directory::Data, "pkg", true).await.unwrap();
        assert!(fs.stat(Directory::Data, "pkg2").await.is_ok());
    }

    #[tokio::test]
    async fn test_rmdir_root_empties_but_keeps_root() {
        let fs = InMemoryFs::new();
        fs.write_file(Directory::Data, "f", "x", UTF8).await.unwrap();

        fs.rmdir(Directory::Data, "", true).await.unwrap();
        assert!(fs.stat(Directory::Data, "f").await.is_err());
        assert!(fs.stat(Directory::Data, "").await.unwrap().file_type.is_dir());
    }

    #[tokio::test]
    async fn test_delete_file_rules() {
        let fs = InMemoryFs::new();
        fs.mkdir(Directory::Data, "d", false).await.unwrap();

        assert!(fs.delete_file(Directory::Data, "d").await.is_err());
        assert!(
            fs.delete_file(Directory::Data, "nope")
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_uri_format() {
        let fs = InMemoryFs::new();
        let uri = fs.get_uri(Directory::Data, "/a//b/").await.unwrap();
        assert_eq!(uri, "memory://data/a/b");
    }

    #[tokio::test]
    async fn test_base64_round_trip() {
        let fs = InMemoryFs::new();
        fs.write_file(Directory::Cache, "blob.bin", "AAEC", None)
            .await
            .unwrap();
        let meta = fs.stat(Directory::Cache, "blob.bin").await.unwrap();
        assert_eq!(meta.size, 3);
        let back = fs.read_file(Directory::Cache, "blob.bin", None).await.unwrap();
        assert_eq!(back, "AAEC");
    }
}
