//! File-based storage backend for persistent storage.

use crate::backend::{ReadSeek, StorageBackend};
use crate::error::{StorageError, StorageResult};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A file-based storage backend.
///
/// Unlike a backend that keeps a descriptor open for its whole lifetime,
/// `FileBackend` only remembers a path. Every operation opens the file,
/// does its work and closes the handle before returning, including on
/// error paths. Another process may therefore read, copy or rotate the
/// file between calls.
///
/// # Durability
///
/// With `sync_on_write` enabled, every append and truncation is followed
/// by `File::sync_data()`. Otherwise data is handed to the OS and the
/// handle is closed.
///
/// # Example
///
/// ```no_run
/// use linkstore_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::create(Path::new("links.jsonl")).unwrap();
/// backend.append(b"{\"id\":1,\"links\":{}}\n").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    sync_on_write: bool,
}

impl FileBackend {
    /// Creates the file at `path` if it does not exist and returns a backend for it.
    ///
    /// Existing contents are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: &Path) -> StorageResult<Self> {
        OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            sync_on_write: false,
        })
    }

    /// Returns a backend for an existing file without creating anything.
    ///
    /// Used by read-only tooling that must not leave empty files behind.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingFile`] if nothing exists at `path`.
    pub fn open_existing(path: &Path) -> StorageResult<Self> {
        if !path.is_file() {
            return Err(StorageError::MissingFile {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            sync_on_write: false,
        })
    }

    /// Sets whether appends and truncations are synced to disk.
    #[must_use]
    pub fn with_sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn append(&mut self, data: &[u8]) -> StorageResult<()> {
        if data.is_empty() {
            return Ok(());
        }

        // A file rotated away since the last call is recreated.
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(data)?;

        if self.sync_on_write {
            file.sync_data()?;
        }

        Ok(())
    }

    fn reader(&self) -> StorageResult<Box<dyn ReadSeek>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(file))
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    fn truncate(&mut self) -> StorageResult<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;

        if self.sync_on_write {
            file.sync_all()?;
        }

        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
