//! GeoJSON output for swath pixel footprints.
//!
//! Each footprint becomes one `Feature` with a closed five-position Polygon
//! ring, an id of the form `r{row}c{col}` and a single `value` property.
//! Missing values are written as `null`; GeoJSON has no NaN.

pub mod error;
pub mod geojson;
pub mod writer;

pub use error::{Result, SerializationError};
pub use geojson::{feature_id, Feature, FeatureCollection, Geometry, Properties};
pub use writer::{serialize, VectorSink};
