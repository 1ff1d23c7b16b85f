//! Loading the record dump that queries run against.
//!
//! The record store writes its materialized records as a JSON array of
//! [`ChangeRecord`]s; csq only ever reads that file.

use std::fs;
use std::path::{Path, PathBuf};

use changespec_query::ChangeRecord;

use super::config::Config;
use super::{CommandError, Result};

/// Resolves the records file: `--records` / `CSQ_RECORDS` first, then the
/// `records` setting of the config file.
pub fn resolve_records_path(flag: Option<&Path>, config: &Config) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }

    config.records.clone().ok_or_else(|| {
        CommandError::Records(
            "No records file given. Pass --records, set CSQ_RECORDS, or set `records` in the config file"
                .to_string(),
        )
    })
}

/// Reads and deserializes the records file.
pub fn load_records(path: &Path) -> Result<Vec<ChangeRecord>> {
    if !path.exists() {
        return Err(CommandError::Records(format!(
            "Records file not found: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;
    let records: Vec<ChangeRecord> = serde_json::from_str(&content).map_err(|e| {
        CommandError::Records(format!("Failed to parse {}: {e}", path.display()))
    })?;

    tracing::debug!(path = %path.display(), count = records.len(), "loaded records");
    Ok(records)
}
