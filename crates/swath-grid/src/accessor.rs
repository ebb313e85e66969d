//! Reading the swath arrays out of a data source.

use tracing::{debug, info};

use crate::array::{Array2, Array3, RawArray};
use crate::error::{GridError, GridResult};
use crate::grids::{BoundsGrid, CenterGrid, SwathGrids, ValueGrid, CORNERS};
use crate::source::DataSource;

/// Options controlling which arrays are loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Also load the quality flag array.
    pub with_quality: bool,
}

/// Load the center, corner and value arrays named by `paths`.
///
/// Fails with [`GridError::DataMissing`] if a variable is absent and with
/// [`GridError::DataShape`] if its rank or leading dimensions disagree with
/// the latitude grid. No other validation happens downstream.
pub fn load_swath(
    source: &dyn DataSource,
    paths: &crate::VariablePaths,
    options: &LoadOptions,
) -> GridResult<SwathGrids> {
    let latitude = read_2d(source, &paths.latitude)?;
    let longitude = read_2d(source, &paths.longitude)?;
    let latitude_bounds = read_3d(source, &paths.latitude_bounds)?;
    let longitude_bounds = read_3d(source, &paths.longitude_bounds)?;
    let (values, unit) = read_2d_with_units(source, &paths.value)?;

    let quality = if options.with_quality {
        Some(read_2d(source, &paths.quality_flag)?)
    } else {
        None
    };

    info!(
        source = %source.describe(),
        latitude = ?latitude.shape(),
        longitude = ?longitude.shape(),
        values = ?values.shape(),
        unit = unit.as_deref().unwrap_or("-"),
        "Loaded swath arrays"
    );

    SwathGrids::new(
        CenterGrid {
            latitude,
            longitude,
        },
        BoundsGrid {
            latitude: latitude_bounds,
            longitude: longitude_bounds,
        },
        ValueGrid { values, unit },
        quality,
        paths,
    )
}

fn require(source: &dyn DataSource, name: &str) -> GridResult<RawArray> {
    let array = source
        .read_array(name)?
        .ok_or_else(|| GridError::DataMissing {
            variable: name.to_string(),
            source_name: source.describe(),
        })?;
    debug!(variable = name, shape = ?array.shape, "Read variable");
    Ok(array)
}

fn read_2d(source: &dyn DataSource, name: &str) -> GridResult<Array2> {
    read_2d_with_units(source, name).map(|(array, _)| array)
}

fn read_2d_with_units(
    source: &dyn DataSource,
    name: &str,
) -> GridResult<(Array2, Option<String>)> {
    let mut raw = require(source, name)?;
    let units = raw.units.take();
    let array = Array2::try_from(raw).map_err(|raw| rank_error(name, &raw, 2))?;
    Ok((array, units))
}

fn read_3d(source: &dyn DataSource, name: &str) -> GridResult<Array3> {
    let raw = require(source, name)?;
    let array = Array3::try_from(raw).map_err(|raw| rank_error(name, &raw, 3))?;
    if array.depth() != CORNERS {
        return Err(GridError::shape(
            name,
            &[array.rows(), array.cols(), CORNERS],
            &array.shape(),
        ));
    }
    Ok(array)
}

fn rank_error(name: &str, raw: &RawArray, rank: usize) -> GridError {
    if raw.shape.len() == rank {
        GridError::InvalidFormat(format!(
            "variable '{}' declares shape {:?} but holds {} values",
            name,
            raw.shape,
            raw.data.len()
        ))
    } else {
        GridError::DataRank {
            variable: name.to_string(),
            expected: rank,
            actual: raw.shape.clone(),
        }
    }
}
