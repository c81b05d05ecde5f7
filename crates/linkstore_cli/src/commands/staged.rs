//! Staged command implementation.

use super::{open_logs, print_record};
use linkstore_core::StoreConfig;

/// Runs the staged command.
pub fn run(config: &StoreConfig, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let logs = open_logs(config)?;
    let staged = logs.staging.load()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&staged)?);
        }
        _ => {
            if staged.is_empty() {
                println!("Staging log is empty");
            }
            for record in &staged {
                print_record(record);
            }
        }
    }

    Ok(())
}
