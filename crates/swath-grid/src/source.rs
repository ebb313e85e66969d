//! Data sources yielding named arrays.

use std::collections::HashMap;
use std::path::Path;

use crate::array::RawArray;
use crate::error::{GridError, GridResult};
use crate::json::JsonSource;

/// A container of named numeric arrays (a NetCDF granule, a JSON dump, ...).
///
/// Implementations must convert fill values to NaN so that downstream code
/// only ever sees `f64` with NaN as the missing marker.
pub trait DataSource {
    /// Human-readable identifier used in error messages.
    fn describe(&self) -> String;

    /// Read a variable by `/`-separated path. `Ok(None)` if it does not exist.
    fn read_array(&self, path: &str) -> GridResult<Option<RawArray>>;
}

/// In-memory source, used for tests and for callers that already hold the arrays.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    arrays: HashMap<String, RawArray>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arrays: HashMap::new(),
        }
    }

    /// Add or replace an array.
    pub fn with_array(mut self, path: impl Into<String>, array: RawArray) -> Self {
        self.insert(path, array);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, array: RawArray) {
        let path = path.into();
        self.arrays.insert(normalize_path(&path).to_string(), array);
    }

    pub fn remove(&mut self, path: &str) -> Option<RawArray> {
        self.arrays.remove(normalize_path(path))
    }

    pub fn arrays(&self) -> &HashMap<String, RawArray> {
        &self.arrays
    }
}

impl DataSource for MemorySource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn read_array(&self, path: &str) -> GridResult<Option<RawArray>> {
        Ok(self.arrays.get(normalize_path(path)).cloned())
    }
}

/// Strip a leading `/` so `"/geolocation/latitude"` and `"geolocation/latitude"` match.
pub(crate) fn normalize_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Open a data source, choosing the reader from the file extension.
///
/// - `.json` is read with [`JsonSource`]
/// - `.nc`, `.nc4`, `.h5`, `.he5` need the `netcdf` feature
pub fn open_source(path: impl AsRef<Path>) -> GridResult<Box<dyn DataSource>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "json" => Ok(Box::new(JsonSource::open(path)?)),
        "nc" | "nc4" | "h5" | "he5" => open_netcdf(path),
        other => Err(GridError::UnsupportedSource {
            path: path.display().to_string(),
            reason: format!("unrecognized extension '{}'", other),
        }),
    }
}

#[cfg(feature = "netcdf")]
fn open_netcdf(path: &Path) -> GridResult<Box<dyn DataSource>> {
    Ok(Box::new(crate::native::NetCdfSource::open(path)?))
}

#[cfg(not(feature = "netcdf"))]
fn open_netcdf(path: &Path) -> GridResult<Box<dyn DataSource>> {
    Err(GridError::UnsupportedSource {
        path: path.display().to_string(),
        reason: "built without the `netcdf` feature".to_string(),
    })
}
