//! Store configuration.

use crate::error::{CoreError, CoreResult};
use linkstore_storage::DEFAULT_CHUNK_SIZE;
use std::path::PathBuf;

/// Environment variable naming the store directory (required by [`StoreConfig::from_env`]).
pub const ENV_DIR_PATH: &str = "STORAGE_DIR_PATH";
/// Environment variable overriding the record log file name.
pub const ENV_FILE_NAME: &str = "STORAGE_FILE_NAME";
/// Environment variable overriding the staging log file name.
pub const ENV_TEMP_FILE_NAME: &str = "STORAGE_TEMP_FILE_NAME";

/// Configuration for opening a [`crate::LinkStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding both logs.
    pub dir_path: PathBuf,

    /// File name of the record log inside `dir_path`.
    pub file_name: String,

    /// File name of the staging log inside `dir_path`.
    pub staging_file_name: String,

    /// Whether to create the directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to sync file data after every append and truncation.
    pub sync_on_write: bool,

    /// Bytes read per step when scanning the record log backwards.
    pub tail_chunk_size: usize,

    /// Whether to hold an exclusive advisory lock on the directory.
    pub lock_dir: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir_path: PathBuf::from("data"),
            file_name: "links.jsonl".to_string(),
            staging_file_name: "links.staging.jsonl".to_string(),
            create_if_missing: true,
            sync_on_write: false,
            tail_chunk_size: DEFAULT_CHUNK_SIZE,
            lock_dir: true,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration for `dir_path` with default values.
    #[must_use]
    pub fn new(dir_path: impl Into<PathBuf>) -> Self {
        Self {
            dir_path: dir_path.into(),
            ..Self::default()
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if `STORAGE_DIR_PATH` is unset.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the directory key is missing.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let dir_path = get(ENV_DIR_PATH)
            .ok_or_else(|| CoreError::invalid_config(format!("{ENV_DIR_PATH} is not set")))?;

        let mut config = Self::new(dir_path);
        if let Some(name) = get(ENV_FILE_NAME) {
            config.file_name = name;
        }
        if let Some(name) = get(ENV_TEMP_FILE_NAME) {
            config.staging_file_name = name;
        }
        Ok(config)
    }

    /// Sets the record log file name.
    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Sets the staging log file name.
    #[must_use]
    pub fn staging_file_name(mut self, name: impl Into<String>) -> Self {
        self.staging_file_name = name.into();
        self
    }

    /// Sets whether to create the directory if missing.
    #[must_use]
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to sync after every write.
    #[must_use]
    pub fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets the tail scan chunk size.
    #[must_use]
    pub fn tail_chunk_size(mut self, size: usize) -> Self {
        self.tail_chunk_size = size;
        self
    }

    /// Sets whether to lock the directory.
    #[must_use]
    pub fn lock_dir(mut self, value: bool) -> Self {
        self.lock_dir = value;
        self
    }

    /// Checks the file names and chunk size.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> CoreResult<()> {
        for (what, name) in [
            ("record log", &self.file_name),
            ("staging log", &self.staging_file_name),
        ] {
            if name.is_empty() {
                return Err(CoreError::invalid_config(format!(
                    "{what} file name is empty"
                )));
            }
            if name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(CoreError::invalid_config(format!(
                    "{what} file name must be a plain file name: {name}"
                )));
            }
        }

        if self.file_name == self.staging_file_name {
            return Err(CoreError::invalid_config(
                "record log and staging log must be different files",
            ));
        }

        if self.tail_chunk_size == 0 {
            return Err(CoreError::invalid_config("tail chunk size must be positive"));
        }

        Ok(())
    }
}
