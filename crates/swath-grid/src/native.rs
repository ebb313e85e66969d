//! Native NetCDF-4 reading using the netcdf library.
//!
//! Granules are opened once and variables are read on demand by group path
//! (`geolocation/latitude`). Packed integer variables are unpacked with
//! `scale_factor` / `add_offset`, and `_FillValue` / `missing_value` become NaN,
//! so callers see the same masked floating point arrays as any other source.

use std::path::{Path, PathBuf};
use std::sync::Once;

use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;
use tracing::debug;

use crate::array::RawArray;
use crate::error::{GridError, GridResult};
use crate::source::{normalize_path, DataSource};

/// Silence HDF5's automatic error printing to stderr.
///
/// HDF5 prints diagnostics for every failed attribute lookup even though the
/// Rust side handles the miss. Safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 with null handlers only disables error printing.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// A NetCDF-4 (or HDF5-backed) granule opened for reading.
pub struct NetCdfSource {
    path: PathBuf,
    file: netcdf::File,
}

impl NetCdfSource {
    pub fn open(path: impl AsRef<Path>) -> GridResult<Self> {
        silence_hdf5_errors();

        let path = path.as_ref().to_path_buf();
        let file = netcdf::open(&path).map_err(|e| {
            GridError::InvalidFormat(format!("Failed to open NetCDF {}: {}", path.display(), e))
        })?;
        Ok(Self { path, file })
    }
}

impl DataSource for NetCdfSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_array(&self, path: &str) -> GridResult<Option<RawArray>> {
        let name = normalize_path(path);
        let Some(var) = self.file.variable(name) else {
            return Ok(None);
        };

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let mut data = read_as_f64(&var)
            .map_err(|e| GridError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;

        let fill_value = get_f64_attr(&var, "_FillValue");
        let missing_value = get_f64_attr(&var, "missing_value");
        let scale_factor = get_f64_attr(&var, "scale_factor").unwrap_or(1.0);
        let add_offset = get_f64_attr(&var, "add_offset").unwrap_or(0.0);

        let mut masked = 0usize;
        for value in data.iter_mut() {
            if Some(*value) == fill_value || Some(*value) == missing_value {
                *value = f64::NAN;
                masked += 1;
            } else {
                *value = *value * scale_factor + add_offset;
            }
        }

        debug!(
            variable = name,
            shape = ?shape,
            masked = masked,
            "Read NetCDF variable"
        );

        let mut array = RawArray::new(shape, data);
        array.units = get_string_attr(&var, "units");
        Ok(Some(array))
    }
}

/// Read all values, converting from the stored numeric type.
fn read_as_f64(var: &netcdf::Variable) -> netcdf::Result<Vec<f64>> {
    fn widen<T: Copy + Into<f64>>(values: Vec<T>) -> Vec<f64> {
        values.into_iter().map(Into::into).collect()
    }

    Ok(match var.vartype() {
        NcVariableType::Float(FloatType::F32) => widen(var.get_values::<f32, _>(..)?),
        NcVariableType::Int(IntType::I8) => widen(var.get_values::<i8, _>(..)?),
        NcVariableType::Int(IntType::U8) => widen(var.get_values::<u8, _>(..)?),
        NcVariableType::Int(IntType::I16) => widen(var.get_values::<i16, _>(..)?),
        NcVariableType::Int(IntType::U16) => widen(var.get_values::<u16, _>(..)?),
        NcVariableType::Int(IntType::I32) => widen(var.get_values::<i32, _>(..)?),
        NcVariableType::Int(IntType::U32) => widen(var.get_values::<u32, _>(..)?),
        _ => var.get_values::<f64, _>(..)?,
    })
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
