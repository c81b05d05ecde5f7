//! Inspect command implementation.

use super::{format_size, open_logs};
use linkstore_core::{LogSummary, RecordId, StoreConfig};
use serde::Serialize;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store directory.
    pub path: String,
    /// Record log statistics.
    pub record_log: LogStats,
    /// Staging log statistics.
    pub staging_log: LogStats,
    /// ID a service would resume from, 0 if the tail cannot be read.
    pub last_id: RecordId,
    /// Why the tail scan failed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_error: Option<String>,
}

/// Statistics for a single log file.
#[derive(Debug, Serialize)]
pub struct LogStats {
    /// File name.
    pub file: String,
    /// File size in bytes.
    pub size: u64,
    /// Number of decodable records.
    pub records: usize,
    /// Number of blank lines.
    pub blank_lines: usize,
    /// Number of lines that do not decode.
    pub unreadable_lines: usize,
    /// Smallest ID present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_id: Option<RecordId>,
    /// Largest ID present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_id: Option<RecordId>,
}

impl LogStats {
    fn new(file: &str, summary: LogSummary) -> Self {
        Self {
            file: file.to_string(),
            size: summary.size,
            records: summary.records,
            blank_lines: summary.blank_lines,
            unreadable_lines: summary.unreadable_lines.len(),
            min_id: summary.id_range.map(|(lo, _)| lo),
            max_id: summary.id_range.map(|(_, hi)| hi),
        }
    }
}

/// Runs the inspect command.
pub fn run(config: &StoreConfig, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(config)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Collects the inspection result for the store described by `config`.
pub fn inspect(config: &StoreConfig) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let logs = open_logs(config)?;

    let (last_id, tail_error) = match logs.records.try_last_id() {
        Ok(id) => (id.unwrap_or(0), None),
        Err(err) => (0, Some(err.to_string())),
    };

    Ok(InspectResult {
        path: config.dir_path.display().to_string(),
        record_log: LogStats::new(&config.file_name, logs.records.summary()?),
        staging_log: LogStats::new(&config.staging_file_name, logs.staging.summary()?),
        last_id,
        tail_error,
    })
}

fn print_log(title: &str, stats: &LogStats) {
    println!("{title} ({}):", stats.file);
    println!("  Size:        {}", format_size(stats.size));
    println!("  Records:     {}", stats.records);
    if stats.blank_lines > 0 {
        println!("  Blank lines: {}", stats.blank_lines);
    }
    if stats.unreadable_lines > 0 {
        println!("  Unreadable:  {}", stats.unreadable_lines);
    }
    if let (Some(min), Some(max)) = (stats.min_id, stats.max_id) {
        println!("  ID range:    {min}..={max}");
    }
}

fn print_text_output(result: &InspectResult) {
    println!("LinkStore Inspection");
    println!("====================");
    println!();
    println!("Path: {}", result.path);
    println!();
    print_log("Record log", &result.record_log);
    println!();
    print_log("Staging log", &result.staging_log);
    println!();
    println!("Last ID: {}", result.last_id);
    if let Some(err) = &result.tail_error {
        println!("  (tail unreadable: {err})");
    }
}
