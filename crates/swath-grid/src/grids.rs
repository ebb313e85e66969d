//! Validated swath grid bundle.
//!
//! A granule is described by four co-located arrays sharing the same
//! `rows x cols` leading shape:
//!
//! - pixel center latitude and longitude (2-D)
//! - pixel corner latitude and longitude (3-D, four corners per pixel)
//! - the scalar measurement (2-D)
//!
//! Shapes are checked once, when the bundle is constructed. Everything
//! downstream can index any of the arrays with the same `(row, col)`.

use serde::{Deserialize, Serialize};

use crate::array::{Array2, Array3};
use crate::error::{GridError, GridResult};

/// Number of corners per pixel in the bounds arrays.
pub const CORNERS: usize = 4;

/// Pixel center coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct CenterGrid {
    pub latitude: Array2,
    pub longitude: Array2,
}

impl CenterGrid {
    pub fn rows(&self) -> usize {
        self.latitude.rows()
    }

    pub fn cols(&self) -> usize {
        self.latitude.cols()
    }

    pub fn cell_count(&self) -> usize {
        self.rows() * self.cols()
    }
}

/// Pixel corner coordinates, `CORNERS` per cell, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsGrid {
    pub latitude: Array3,
    pub longitude: Array3,
}

impl BoundsGrid {
    /// Corner `(lon, lat)` pairs for one cell, in the order stored by the source.
    pub fn corners(&self, row: usize, col: usize) -> [[f64; 2]; CORNERS] {
        let lats = self.latitude.cell(row, col);
        let lons = self.longitude.cell(row, col);
        std::array::from_fn(|k| [lons[k], lats[k]])
    }
}

/// The scalar measurement and its physical unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGrid {
    pub values: Array2,
    pub unit: Option<String>,
}

/// Four co-located arrays with matching leading dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct SwathGrids {
    centers: CenterGrid,
    bounds: BoundsGrid,
    values: ValueGrid,
    quality: Option<Array2>,
}

impl SwathGrids {
    /// Bundle the arrays, checking that every one matches the latitude grid.
    ///
    /// `names` is only used to label errors.
    pub fn new(
        centers: CenterGrid,
        bounds: BoundsGrid,
        values: ValueGrid,
        quality: Option<Array2>,
        names: &VariablePaths,
    ) -> GridResult<Self> {
        let [rows, cols] = centers.latitude.shape();
        let expect2 = |name: &str, shape: [usize; 2]| -> GridResult<()> {
            if shape != [rows, cols] {
                return Err(GridError::shape(name, &[rows, cols], &shape));
            }
            Ok(())
        };
        let expect3 = |name: &str, shape: [usize; 3]| -> GridResult<()> {
            if shape != [rows, cols, CORNERS] {
                return Err(GridError::shape(name, &[rows, cols, CORNERS], &shape));
            }
            Ok(())
        };

        expect2(&names.longitude, centers.longitude.shape())?;
        expect3(&names.latitude_bounds, bounds.latitude.shape())?;
        expect3(&names.longitude_bounds, bounds.longitude.shape())?;
        expect2(&names.value, values.values.shape())?;
        if let Some(quality) = &quality {
            expect2(&names.quality_flag, quality.shape())?;
        }

        Ok(Self {
            centers,
            bounds,
            values,
            quality,
        })
    }

    pub fn centers(&self) -> &CenterGrid {
        &self.centers
    }

    pub fn bounds(&self) -> &BoundsGrid {
        &self.bounds
    }

    pub fn values(&self) -> &ValueGrid {
        &self.values
    }

    pub fn quality(&self) -> Option<&Array2> {
        self.quality.as_ref()
    }

    pub fn rows(&self) -> usize {
        self.centers.rows()
    }

    pub fn cols(&self) -> usize {
        self.centers.cols()
    }
}

/// Names of the variables making up a swath.
///
/// Nested group members use `/` separators. Defaults are the TEMPO L2 NO2
/// product layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariablePaths {
    pub latitude: String,
    pub longitude: String,
    pub latitude_bounds: String,
    pub longitude_bounds: String,
    pub value: String,
    pub quality_flag: String,
}

impl Default for VariablePaths {
    fn default() -> Self {
        Self {
            latitude: "geolocation/latitude".to_string(),
            longitude: "geolocation/longitude".to_string(),
            latitude_bounds: "geolocation/latitude_bounds".to_string(),
            longitude_bounds: "geolocation/longitude_bounds".to_string(),
            value: "product/vertical_column_troposphere".to_string(),
            quality_flag: "product/main_data_quality_flag".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centers(rows: usize, cols: usize) -> CenterGrid {
        CenterGrid {
            latitude: Array2::from_fn(rows, cols, |r, _| r as f64),
            longitude: Array2::from_fn(rows, cols, |_, c| c as f64),
        }
    }

    fn bounds(rows: usize, cols: usize, depth: usize) -> BoundsGrid {
        BoundsGrid {
            latitude: Array3::from_fn(rows, cols, depth, |r, _, k| (r * 10 + k) as f64),
            longitude: Array3::from_fn(rows, cols, depth, |_, c, k| c as f64 * 10.0 - k as f64),
        }
    }

    fn values(rows: usize, cols: usize) -> ValueGrid {
        ValueGrid {
            values: Array2::from_fn(rows, cols, |r, c| (r * cols + c) as f64),
            unit: None,
        }
    }

    #[test]
    fn test_matching_shapes_accepted() {
        let grids = SwathGrids::new(
            centers(2, 3),
            bounds(2, 3, 4),
            values(2, 3),
            None,
            &VariablePaths::default(),
        )
        .unwrap();
        assert_eq!(grids.rows(), 2);
        assert_eq!(grids.cols(), 3);
    }

    #[test]
    fn test_value_shape_mismatch_names_variable() {
        let err = SwathGrids::new(
            centers(2, 3),
            bounds(2, 3, 4),
            values(3, 2),
            None,
            &VariablePaths::default(),
        )
        .unwrap_err();
        match err {
            GridError::DataShape {
                variable,
                expected,
                actual,
            } => {
                assert_eq!(variable, "product/vertical_column_troposphere");
                assert_eq!(expected, vec![2, 3]);
                assert_eq!(actual, vec![3, 2]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_corner_depth_must_be_four() {
        let err = SwathGrids::new(
            centers(2, 2),
            bounds(2, 2, 3),
            values(2, 2),
            None,
            &VariablePaths::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GridError::DataShape { ref variable, .. } if variable.ends_with("latitude_bounds")
        ));
    }

    #[test]
    fn test_corners_are_lon_lat_in_source_order() {
        let b = bounds(1, 1, 4);
        let corners = b.corners(0, 0);
        assert_eq!(corners[0], [0.0, 0.0]);
        assert_eq!(corners[3], [-3.0, 3.0]);
    }
}
