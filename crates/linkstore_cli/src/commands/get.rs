//! Get command implementation.

use super::{open_logs, print_record};
use linkstore_core::{Record, RecordId, StoreConfig};

/// Runs the get command.
///
/// Prints every record found and fails if any ID was missing.
pub fn run(
    config: &StoreConfig,
    ids: &[RecordId],
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let (found, missing) = lookup(config, ids)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
        _ => {
            for record in &found {
                print_record(record);
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("records not found: {missing:?}").into())
    }
}

/// Looks up each ID, returning the records found and the IDs that were not.
pub fn lookup(
    config: &StoreConfig,
    ids: &[RecordId],
) -> Result<(Vec<Record>, Vec<RecordId>), Box<dyn std::error::Error>> {
    let logs = open_logs(config)?;
    let mut found = Vec::with_capacity(ids.len());
    let mut missing = Vec::new();

    for &id in ids {
        match logs.records.get(id) {
            Ok(record) => found.push(record),
            Err(err) if err.is_not_found() => missing.push(id),
            Err(err) => return Err(err.into()),
        }
    }

    Ok((found, missing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkstore_core::LinkStore;
    use tempfile::tempdir;

    #[test]
    fn lookup_splits_found_and_missing() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::new(dir.path());
        let store = LinkStore::open(config.clone()).unwrap();
        store.save(&Record::new(1).with_link("http://a", "ok")).unwrap();
        store.save(&Record::new(3)).unwrap();

        let (found, missing) = lookup(&config, &[3, 2, 1]).unwrap();
        assert_eq!(found.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(missing, vec![2]);
    }
}
