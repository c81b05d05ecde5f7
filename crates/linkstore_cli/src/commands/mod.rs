//! CLI command implementations.

pub mod get;
pub mod inspect;
pub mod staged;
pub mod verify;

use linkstore_core::{Record, RecordLog, StagingLog, StoreConfig, ENV_DIR_PATH};
use linkstore_storage::FileBackend;
use std::path::PathBuf;

/// Builds the store configuration from flags, falling back to the
/// environment for anything not given.
pub fn resolve_config(
    path: Option<PathBuf>,
    file_name: Option<String>,
    staging_file_name: Option<String>,
) -> Result<StoreConfig, Box<dyn std::error::Error>> {
    resolve_config_with(path, file_name, staging_file_name, |key| std::env::var(key).ok())
}

/// Like [`resolve_config`], reading fallbacks through `lookup`.
pub fn resolve_config_with<F>(
    path: Option<PathBuf>,
    file_name: Option<String>,
    staging_file_name: Option<String>,
    lookup: F,
) -> Result<StoreConfig, Box<dyn std::error::Error>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let mut config = StoreConfig::from_lookup(|key| match key {
                ENV_DIR_PATH => Some(path.display().to_string()),
                _ => lookup(key),
            })?;
            config.dir_path = path;
            config
        }
        None => StoreConfig::from_lookup(&lookup)
            .map_err(|_| format!("store path required: pass --path or set {ENV_DIR_PATH}"))?,
    };

    if let Some(name) = file_name {
        config = config.file_name(name);
    }
    if let Some(name) = staging_file_name {
        config = config.staging_file_name(name);
    }
    config.validate()?;

    Ok(config)
}

/// Both logs of an existing store, opened without the directory lock.
pub struct Logs {
    /// The record log.
    pub records: RecordLog,
    /// The staging log.
    pub staging: StagingLog,
    /// Path of the record log.
    pub record_path: PathBuf,
    /// Path of the staging log.
    pub staging_path: PathBuf,
}

/// Opens both logs of the store described by `config` for reading.
///
/// Fails if either file is missing; nothing is created.
pub fn open_logs(config: &StoreConfig) -> Result<Logs, Box<dyn std::error::Error>> {
    let record_path = config.dir_path.join(&config.file_name);
    let staging_path = config.dir_path.join(&config.staging_file_name);

    if !record_path.exists() && !staging_path.exists() {
        return Err(format!("No link store found at {}", config.dir_path.display()).into());
    }

    let records = FileBackend::open_existing(&record_path)?;
    let staging = FileBackend::open_existing(&staging_path)?;

    Ok(Logs {
        records: RecordLog::new(Box::new(records), config.tail_chunk_size),
        staging: StagingLog::new(Box::new(staging)),
        record_path,
        staging_path,
    })
}

/// Prints one record as an indented block.
pub fn print_record(record: &Record) {
    println!("#{} ({} links)", record.id, record.links.len());
    for (url, status) in &record.links {
        println!("  {status:<16} {url}");
    }
}

/// Formats a byte count for humans.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
