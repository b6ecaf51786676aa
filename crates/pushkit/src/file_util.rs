//! Update-package file operations.
//!
//! Each operation is a single capability call, or a strictly sequential
//! series of them. Failures are handled per operation:
//!
//! | Operation | On failure |
//! |-----------|------------|
//! | existence checks | reported as `false`, never surfaced |
//! | clean / delete directory / uri / read | propagated unchanged |
//! | batch delete | logged per entry, the batch still completes |
//! | write | wrapped in [`Error::Write`] carrying the backend error code |

use crate::error::{Error, Result};
use crate::fs::{Directory, Encoding, PathRef};
use crate::logging_impl::format_content_for_log;
use crate::FileUtil;

/// Metadata file macOS drops into every folder it touches.
pub const DS_STORE: &str = ".DS_Store";

/// Resource-fork folder macOS adds to zip archives.
pub const MACOSX_METADATA: &str = "__MACOSX";

/// Make sure `ignore_list` names both macOS metadata entries.
///
/// Entries already present are not duplicated. Missing ones are appended,
/// [`DS_STORE`] first.
pub fn normalize_ignore_list(ignore_list: &mut Vec<String>) {
    for name in [DS_STORE, MACOSX_METADATA] {
        if !ignore_list.iter().any(|entry| entry == name) {
            ignore_list.push(name.to_string());
        }
    }
}

impl FileUtil {
    /// True if `path` under `directory` exists and is a directory.
    ///
    /// Any failure, including permission errors, counts as "does not exist".
    pub async fn directory_exists(&self, directory: Directory, path: &str) -> bool {
        matches!(self.fs.stat(directory, path).await, Ok(meta) if meta.file_type.is_dir())
    }

    /// True if `path` under `directory` exists and is a regular file.
    ///
    /// Any failure, including permission errors, counts as "does not exist".
    pub async fn file_exists(&self, directory: Directory, path: &str) -> bool {
        matches!(self.fs.stat(directory, path).await, Ok(meta) if meta.file_type.is_file())
    }

    pub async fn data_directory_exists(&self, path: &str) -> bool {
        self.directory_exists(self.data_directory, path).await
    }

    /// Makes sure the given data directory exists and is empty.
    ///
    /// Deletes the directory if present, recreates it with any missing
    /// parents, and returns its uri.
    pub async fn clean_data_directory(&self, path: &str) -> Result<String> {
        let log_path = self.log_config.path(path);
        tracing::debug!(path = %log_path, "cleaning data directory");

        if self.data_directory_exists(path).await {
            self.delete_data_directory(path).await?;
        }

        self.fs.mkdir(self.data_directory, path, true).await?;
        let uri = self.fs.get_uri(self.data_directory, path).await?;

        tracing::debug!(path = %log_path, uri = %self.log_config.truncate(&uri), "data directory ready");
        Ok(uri)
    }

    pub async fn get_uri(&self, directory: Directory, path: &str) -> Result<String> {
        self.fs.get_uri(directory, path).await
    }

    pub async fn get_data_uri(&self, path: &str) -> Result<String> {
        self.get_uri(self.data_directory, path).await
    }

    /// Copy the entries of one directory into another.
    ///
    /// Not implemented: returns `Ok(())` without copying anything. Only the
    /// ignore list is normalized (see [`normalize_ignore_list`]), and the
    /// normalized list is not used.
    pub async fn copy_directory_entries_to(
        &self,
        source: &PathRef,
        destination: &PathRef,
        ignore_list: &mut Vec<String>,
    ) -> Result<()> {
        normalize_ignore_list(ignore_list);

        // TODO: recursive directory copy needs a native implementation in the host capability
        tracing::debug!(
            source = %source,
            destination = %destination,
            ignore = ?ignore_list,
            "directory copy not implemented, skipping"
        );
        Ok(())
    }

    /// Copy a single file. Not implemented: returns `Ok(())` immediately.
    pub async fn copy_file(&self, source: &PathRef, destination: &PathRef) -> Result<()> {
        tracing::debug!(source = %source, destination = %destination, "file copy not implemented, skipping");
        Ok(())
    }

    /// Recursively deletes a data directory and its contents.
    pub async fn delete_data_directory(&self, path: &str) -> Result<()> {
        self.fs.rmdir(self.data_directory, path, true).await
    }

    /// Deletes the named files from a data directory.
    ///
    /// Names are processed one at a time, in order. Missing entries (and
    /// directories) are skipped. A failed delete is logged and the batch moves
    /// on, so this always returns `Ok(())`.
    pub async fn delete_entries_from_data_directory<I, S>(
        &self,
        dir_path: &str,
        files_to_delete: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for file in files_to_delete {
            let path = format!("{}/{}", dir_path, file.as_ref());
            if !self.file_exists(self.data_directory, &path).await {
                continue;
            }

            if let Err(err) = self.fs.delete_file(self.data_directory, &path).await {
                tracing::warn!(
                    path = %self.log_config.path(&path),
                    error = %err,
                    "could not delete file"
                );
            }
        }

        Ok(())
    }

    /// Writes a UTF-8 string to a file, creating or replacing it.
    ///
    /// `create_if_not_exists` is accepted for API compatibility but does not
    /// change behavior: the file is always created or overwritten.
    pub async fn write_string_to_file(
        &self,
        content: &str,
        directory: Directory,
        path: &str,
        create_if_not_exists: bool,
    ) -> Result<()> {
        let log_path = self.log_config.path(path);
        tracing::trace!(
            directory = %directory,
            path = %log_path,
            create_if_not_exists,
            content = %format_content_for_log(content, &self.log_config),
            "writing string file"
        );

        self.fs
            .write_file(directory, path, content, Some(Encoding::Utf8))
            .await
            .map_err(|err| {
                let err = Error::write(err);
                tracing::warn!(directory = %directory, path = %log_path, code = %err.code(), "write failed");
                err
            })
    }

    pub async fn write_string_to_data_file(
        &self,
        content: &str,
        path: &str,
        create_if_not_exists: bool,
    ) -> Result<()> {
        self.write_string_to_file(content, self.data_directory, path, create_if_not_exists)
            .await
    }

    /// Reads a UTF-8 file. Failures are returned as-is.
    pub async fn read_file(&self, directory: Directory, path: &str) -> Result<String> {
        self.fs
            .read_file(directory, path, Some(Encoding::Utf8))
            .await
    }

    pub async fn read_data_file(&self, path: &str) -> Result<String> {
        self.read_file(self.data_directory, path).await
    }
}
