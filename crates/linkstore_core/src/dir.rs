//! Store directory management.
//!
//! This module handles the file system layout for LinkStore:
//!
//! ```text
//! <dir_path>/
//! ├─ LOCK                  # Advisory lock for single-writer (optional)
//! ├─ links.jsonl           # Record log (name configurable)
//! └─ links.staging.jsonl   # Staging log (name configurable)
//! ```
//!
//! The LOCK file only excludes other LinkStore writers. Readers such as log
//! shippers or the `linkstore` CLI can open both logs at any time.

use crate::config::StoreConfig;
use crate::error::{CoreError, CoreResult};
use fs2::FileExt;
use linkstore_storage::FileBackend;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";

/// Manages the store directory and, optionally, its lock.
///
/// # Example
///
/// ```rust,ignore
/// use linkstore_core::StoreDir;
/// use std::path::Path;
///
/// let dir = StoreDir::open(Path::new("data"), true, true)?;
/// println!("lock held for {:?}", dir.path());
/// ```
#[derive(Debug)]
pub struct StoreDir {
    /// Root directory path.
    path: PathBuf,
    /// Lock file handle (held for exclusive access).
    _lock_file: Option<File>,
}

impl StoreDir {
    /// Opens or creates a store directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the store directory
    /// * `create_if_missing` - If true, creates the directory if it doesn't exist
    /// * `lock` - If true, takes an exclusive advisory lock on `LOCK`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - The directory cannot be created or is not a directory
    /// - Another process holds the lock (returns `StoreLocked`)
    pub fn open(path: &Path, create_if_missing: bool, lock: bool) -> CoreResult<Self> {
        if !path.exists() {
            if !create_if_missing {
                return Err(CoreError::invalid_config(format!(
                    "store directory does not exist: {}",
                    path.display()
                )));
            }
            fs::create_dir_all(path).map_err(|err| {
                CoreError::invalid_config(format!(
                    "failed to create dir {}: {err}",
                    path.display()
                ))
            })?;
        }

        if !path.is_dir() {
            return Err(CoreError::invalid_config(format!(
                "path is not a directory: {}",
                path.display()
            )));
        }

        let lock_file = if lock {
            let lock_path = path.join(LOCK_FILE);
            let lock_file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&lock_path)
                .map_err(|err| {
                    CoreError::invalid_config(format!(
                        "failed to create lock file {}: {err}",
                        lock_path.display()
                    ))
                })?;

            if lock_file.try_lock_exclusive().is_err() {
                return Err(CoreError::StoreLocked);
            }
            Some(lock_file)
        } else {
            None
        };

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the path to the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of a log file inside the directory.
    #[must_use]
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    /// Creates (if needed) the record log and staging log named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if either file cannot be created.
    pub fn create_logs(&self, config: &StoreConfig) -> CoreResult<(FileBackend, FileBackend)> {
        let create = |name: &str| {
            let path = self.file_path(name);
            FileBackend::create(&path)
                .map(|backend| backend.with_sync_on_write(config.sync_on_write))
                .map_err(|err| {
                    CoreError::invalid_config(format!(
                        "failed to create file {}: {err}",
                        path.display()
                    ))
                })
        };

        Ok((create(&config.file_name)?, create(&config.staging_file_name)?))
    }
}
