//! Swath grid access for satellite L2 granules (TEMPO, TROPOMI-like layouts).
//!
//! Reads the four co-located arrays a pixel footprint needs:
//!
//! - center latitude / longitude, `rows x cols`
//! - corner latitude / longitude bounds, `rows x cols x 4`
//! - the measured scalar, `rows x cols`
//!
//! and returns them as a validated [`SwathGrids`] bundle. Arrays come from a
//! [`DataSource`]: an in-memory [`MemorySource`], a [`JsonSource`] dump, or a
//! NetCDF-4 granule when built with the `netcdf` feature.
//!
//! # Missing data
//!
//! All sources report missing values as NaN. NetCDF fill values are masked and
//! packed integers are unpacked while reading.

pub mod accessor;
pub mod array;
pub mod error;
pub mod grids;
pub mod json;
#[cfg(feature = "netcdf")]
pub mod native;
pub mod source;

pub use accessor::{load_swath, LoadOptions};
pub use array::{element_count, Array2, Array3, RawArray};
pub use error::{GridError, GridResult};
pub use grids::{BoundsGrid, CenterGrid, SwathGrids, ValueGrid, VariablePaths, CORNERS};
pub use json::{Infinity, JsonDocument, JsonNumber, JsonSource, JsonVariable};
#[cfg(feature = "netcdf")]
pub use native::NetCdfSource;
pub use source::{open_source, DataSource, MemorySource};
