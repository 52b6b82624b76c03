use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema file '{}' could not be read: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema file '{}' is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads the extraction schema from disk.
///
/// Called once per extraction so edits to the file apply to the next request
/// without a restart. A missing or malformed file aborts the extraction before
/// any text is sent anywhere.
pub async fn load_schema(path: &Path) -> Result<Value, SchemaError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let schema: Value = serde_json::from_str(&raw).map_err(|source| SchemaError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), bytes = raw.len(), "Schema loaded");
    Ok(schema)
}
