//! Error types for swath grid loading.

use thiserror::Error;

/// Result type for swath grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Error types for reading swath grids from a data source.
#[derive(Error, Debug)]
pub enum GridError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A required variable is absent from the data source
    #[error("variable '{variable}' not found in {source_name}")]
    DataMissing {
        variable: String,
        source_name: String,
    },

    /// A variable's shape disagrees with the latitude grid
    #[error("variable '{variable}' has shape {actual:?}, expected {expected:?}")]
    DataShape {
        variable: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A variable has the wrong number of dimensions
    #[error("variable '{variable}' has shape {actual:?}, expected {expected} dimensions")]
    DataRank {
        variable: String,
        expected: usize,
        actual: Vec<usize>,
    },

    /// The source could not be decoded
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// No reader is available for the given file
    #[error("Unsupported source '{path}': {reason}")]
    UnsupportedSource { path: String, reason: String },
}

impl GridError {
    pub(crate) fn shape(variable: &str, expected: &[usize], actual: &[usize]) -> Self {
        GridError::DataShape {
            variable: variable.to_string(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}
