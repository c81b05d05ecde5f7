//! Verify command implementation.

use super::open_logs;
use linkstore_core::StoreConfig;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Problems that make the store unusable.
    pub errors: Vec<String>,
    /// Problems the store tolerates.
    pub warnings: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(config: &StoreConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying link store at {}", config.dir_path.display());
    println!();

    let result = verify(config)?;

    for warning in &result.warnings {
        println!("  warning: {warning}");
    }
    for error in &result.errors {
        println!("  error:   {error}");
    }

    println!();
    if result.is_ok() {
        println!("✓ Store verification passed");
        Ok(())
    } else {
        println!("✗ Store verification failed");
        Err("Verification failed".into())
    }
}

/// Checks both logs line by line.
///
/// Undecodable record log lines are warnings: lookups skip them. A bad
/// staging line is an error because loading the staging log would fail.
pub fn verify(config: &StoreConfig) -> Result<VerifyResult, Box<dyn std::error::Error>> {
    let logs = open_logs(config)?;
    let mut result = VerifyResult::default();

    let records = logs.records.summary()?;
    for line in &records.unreadable_lines {
        result.warnings.push(format!(
            "{}:{line}: record does not decode and will be skipped",
            logs.record_path.display()
        ));
    }
    if let Err(err) = logs.records.try_last_id() {
        result.warnings.push(format!(
            "{}: last line unreadable, last ID will recover as 0: {err}",
            logs.record_path.display()
        ));
    }

    let staging = logs.staging.summary()?;
    for line in &staging.unreadable_lines {
        result.errors.push(format!(
            "{}:{line}: staged record does not decode",
            logs.staging_path.display()
        ));
    }

    Ok(result)
}
