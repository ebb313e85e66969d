//! Error types for GeoJSON output.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SerializationError>;

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
