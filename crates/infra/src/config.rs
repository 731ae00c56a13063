//! Policy configuration loading.
//!
//! The table is read, parsed and validated once at startup; any fault here
//! is fatal. The process must never serve traffic with a partially valid
//! policy set.

use std::path::Path;

use thiserror::Error;

use crewdesk_auth::{PolicyConfig, PolicyConfigError, PolicyTable};

#[derive(Debug, Error)]
pub enum PolicyLoadError {
    #[error("failed to read policy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Invalid(#[from] PolicyConfigError),
}

/// Read, parse and validate a policy file.
pub fn load_policy(path: impl AsRef<Path>) -> Result<PolicyTable, PolicyLoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| PolicyLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let config = PolicyConfig::from_json_str(&text)?;
    let table = PolicyTable::from_config(config)?;

    tracing::info!(
        path = %path.display(),
        kinds = table.kinds().count(),
        "policy table loaded"
    );
    Ok(table)
}
