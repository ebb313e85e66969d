//! Error types for footprint selection.

use thiserror::Error;

/// Result type for footprint operations.
pub type Result<T> = std::result::Result<T, FootprintError>;

/// Errors raised while preparing a selection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FootprintError {
    /// A reference point coordinate or radius is unusable.
    #[error("invalid reference point: {field} = {value}")]
    InvalidReference { field: &'static str, value: f64 },
}
