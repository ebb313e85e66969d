//! Swath pixel footprint extraction.
//!
//! Reads a satellite granule, selects pixels (optionally within a radius of
//! a point), and writes the selected pixel outlines both as a PNG plot and as
//! a GeoJSON FeatureCollection.

pub mod config;
pub mod pipeline;

pub use config::{FileConfig, OutputPaths, PipelineConfig};
pub use pipeline::{run, run_with_source, EmptyReason, PipelineOutcome, PipelineReport};
