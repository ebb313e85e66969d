//! Spatial pixel selection.
//!
//! Distances are planar in degrees: `sqrt(dlat^2 + dlon^2)`. This is not a
//! great-circle distance. It stretches east-west away from the equator and is
//! only meaningful for small radii; it matches how the footprints have always
//! been selected and is kept as a known approximation.

use serde::Serialize;
use swath_grid::{Array2, CenterGrid};
use tracing::debug;

use crate::error::{FootprintError, Result};

/// Radius used when a reference point is given without one (degrees).
pub const DEFAULT_RADIUS: f64 = 0.5;

/// Point of interest and selection radius, in the grid's coordinate units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferencePoint {
    lat: f64,
    lon: f64,
    radius: f64,
}

impl ReferencePoint {
    /// Coordinates must be finite and the radius finite and non-negative.
    pub fn new(lat: f64, lon: f64, radius: f64) -> Result<Self> {
        if !lat.is_finite() {
            return Err(FootprintError::InvalidReference {
                field: "latitude",
                value: lat,
            });
        }
        if !lon.is_finite() {
            return Err(FootprintError::InvalidReference {
                field: "longitude",
                value: lon,
            });
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(FootprintError::InvalidReference {
                field: "radius",
                value: radius,
            });
        }
        Ok(Self { lat, lon, radius })
    }

    pub fn with_default_radius(lat: f64, lon: f64) -> Result<Self> {
        Self::new(lat, lon, DEFAULT_RADIUS)
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Planar distance from the reference point, in degrees.
    #[inline]
    pub fn distance(&self, lat: f64, lon: f64) -> f64 {
        ((lat - self.lat).powi(2) + (lon - self.lon).powi(2)).sqrt()
    }

    #[inline]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.distance(lat, lon) <= self.radius
    }
}

/// Which grid cells passed selection.
///
/// Only produced by [`select`]; read-only afterwards apart from further
/// narrowing with [`SelectionMask::retain_quality`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionMask {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
    selected: usize,
}

impl SelectionMask {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of selected cells.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected == 0
    }

    #[inline]
    pub fn is_selected(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.cols + col]
    }

    /// Selected `(row, col)` pairs in row-major order.
    pub fn iter_selected(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &on)| on)
            .map(move |(idx, _)| (idx / cols, idx % cols))
    }

    /// Drop cells whose quality flag is missing or above `max_flag`.
    pub fn retain_quality(mut self, quality: &Array2, max_flag: f64) -> Self {
        debug_assert_eq!(quality.shape(), [self.rows, self.cols]);

        for (on, &flag) in self.cells.iter_mut().zip(quality.as_slice()) {
            // NaN compares false, so missing flags are dropped too
            let passes = flag <= max_flag;
            if *on && !passes {
                *on = false;
                self.selected -= 1;
            }
        }
        self
    }
}

/// Select grid cells by their center coordinates.
///
/// Without a reference point every cell with finite center coordinates is
/// selected. With one, a cell is selected iff its coordinates are finite and
/// its planar distance to the point is `<= radius`. Cells with NaN (or
/// infinite) centers are never selected.
pub fn select(centers: &CenterGrid, reference: Option<&ReferencePoint>) -> SelectionMask {
    let rows = centers.rows();
    let cols = centers.cols();
    let lats = centers.latitude.as_slice();
    let lons = centers.longitude.as_slice();

    let cells: Vec<bool> = lats
        .iter()
        .zip(lons)
        .map(|(&lat, &lon)| {
            if !lat.is_finite() || !lon.is_finite() {
                return false;
            }
            reference.map_or(true, |point| point.contains(lat, lon))
        })
        .collect();
    let selected = cells.iter().filter(|&&on| on).count();

    debug!(
        rows = rows,
        cols = cols,
        selected = selected,
        reference = ?reference,
        "Computed selection mask"
    );

    SelectionMask {
        rows,
        cols,
        cells,
        selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(lats: Vec<f64>, lons: Vec<f64>, cols: usize) -> CenterGrid {
        let rows = lats.len() / cols;
        CenterGrid {
            latitude: Array2::from_vec(rows, cols, lats).unwrap(),
            longitude: Array2::from_vec(rows, cols, lons).unwrap(),
        }
    }

    #[test]
    fn test_reference_point_validation() {
        assert!(ReferencePoint::new(40.0, -100.0, 0.0).is_ok());
        assert_eq!(
            ReferencePoint::new(40.0, -100.0, -0.1),
            Err(FootprintError::InvalidReference {
                field: "radius",
                value: -0.1
            })
        );
        assert!(ReferencePoint::new(f64::NAN, 0.0, 1.0).is_err());
        assert!(ReferencePoint::new(0.0, f64::INFINITY, 1.0).is_err());
        assert_eq!(
            ReferencePoint::with_default_radius(1.0, 2.0).unwrap().radius(),
            DEFAULT_RADIUS
        );
    }

    #[test]
    fn test_distance_is_planar() {
        let point = ReferencePoint::new(0.0, 0.0, 5.0).unwrap();
        assert_eq!(point.distance(3.0, 4.0), 5.0);
        assert!(point.contains(3.0, 4.0));
    }

    #[test]
    fn test_iter_selected_row_major() {
        let g = grid(vec![0.0, f64::NAN, 1.0, 1.0], vec![0.0, 1.0, f64::NAN, 1.0], 2);
        let mask = select(&g, None);
        assert_eq!(mask.iter_selected().collect::<Vec<_>>(), vec![(0, 0), (1, 1)]);
        assert_eq!(mask.selected(), 2);
    }

    #[test]
    fn test_retain_quality_drops_bad_and_missing_flags() {
        let g = grid(vec![0.0; 4], vec![0.0; 4], 2);
        let quality = Array2::from_vec(2, 2, vec![0.0, 1.0, 2.0, f64::NAN]).unwrap();

        let mask = select(&g, None).retain_quality(&quality, 1.0);
        assert_eq!(mask.selected(), 2);
        assert!(mask.is_selected(0, 1));
        assert!(!mask.is_selected(1, 0));
        assert!(!mask.is_selected(1, 1));
    }
}
