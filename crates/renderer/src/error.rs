//! Error types for raster rendering.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Error, Debug)]
pub enum RenderError {
    /// Nothing was selected, so there is no image to make.
    #[error("no footprints to render")]
    EmptyInput,

    /// Every footprint had at least one non-finite vertex.
    #[error("none of the {skipped} footprints has finite vertices")]
    NothingToDraw { skipped: usize },

    #[error("cannot allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
