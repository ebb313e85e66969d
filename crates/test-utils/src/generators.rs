//! Synthetic swath generators.
//!
//! A [`SyntheticSwath`] is a regular lat/lon grid laid out the way a TEMPO
//! granule stores it: center coordinates, four corners per pixel
//! (counter-clockwise from the south-west corner) and one value per pixel.
//! All quantities are closed-form so tests can compute the expected output.

use std::path::{Path, PathBuf};

use swath_grid::{JsonDocument, MemorySource, RawArray, VariablePaths};

/// Builder for a synthetic swath.
#[derive(Debug, Clone)]
pub struct SyntheticSwath {
    pub rows: usize,
    pub cols: usize,
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub step: f64,
    pub unit: Option<String>,
    nan_latitude: Vec<(usize, usize)>,
    nan_value: Vec<(usize, usize)>,
}

impl SyntheticSwath {
    /// A `rows x cols` swath at 40N 100W on a 0.1 degree grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            origin_lat: 40.0,
            origin_lon: -100.0,
            step: 0.1,
            unit: Some("mol/m^2".to_string()),
            nan_latitude: Vec::new(),
            nan_value: Vec::new(),
        }
    }

    pub fn origin(mut self, lat: f64, lon: f64) -> Self {
        self.origin_lat = lat;
        self.origin_lon = lon;
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn without_unit(mut self) -> Self {
        self.unit = None;
        self
    }

    /// Blank out the center latitude of one cell; its corners stay valid.
    pub fn with_nan_latitude(mut self, row: usize, col: usize) -> Self {
        self.nan_latitude.push((row, col));
        self
    }

    /// Blank out the measured value of one cell.
    pub fn with_nan_value(mut self, row: usize, col: usize) -> Self {
        self.nan_value.push((row, col));
        self
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Center `(lat, lon)` of a cell, before any NaN overrides.
    pub fn center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.origin_lat + row as f64 * self.step,
            self.origin_lon + col as f64 * self.step,
        )
    }

    /// Corners as `[lon, lat]`: SW, SE, NE, NW.
    pub fn corners(&self, row: usize, col: usize) -> [[f64; 2]; 4] {
        let (lat, lon) = self.center(row, col);
        let h = self.step / 2.0;
        [
            [lon - h, lat - h],
            [lon + h, lat - h],
            [lon + h, lat + h],
            [lon - h, lat + h],
        ]
    }

    /// Value of a cell: `(row * cols + col + 1) * 1e-5`, before NaN overrides.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        (row * self.cols + col + 1) as f64 * 1.0e-5
    }

    /// Quality flag of a cell: `col % 3`.
    pub fn quality(&self, _row: usize, col: usize) -> f64 {
        (col % 3) as f64
    }

    /// Materialize the swath under the default variable paths.
    pub fn source(&self) -> MemorySource {
        self.source_with_paths(&VariablePaths::default())
    }

    pub fn source_with_paths(&self, paths: &VariablePaths) -> MemorySource {
        let (rows, cols) = (self.rows, self.cols);
        let n = self.cell_count();
        let mut lat = Vec::with_capacity(n);
        let mut lon = Vec::with_capacity(n);
        let mut lat_b = Vec::with_capacity(n * 4);
        let mut lon_b = Vec::with_capacity(n * 4);
        let mut value = Vec::with_capacity(n);
        let mut quality = Vec::with_capacity(n);

        for r in 0..rows {
            for c in 0..cols {
                let (la, lo) = self.center(r, c);
                lat.push(if self.nan_latitude.contains(&(r, c)) {
                    f64::NAN
                } else {
                    la
                });
                lon.push(lo);
                for [corner_lon, corner_lat] in self.corners(r, c) {
                    lon_b.push(corner_lon);
                    lat_b.push(corner_lat);
                }
                value.push(if self.nan_value.contains(&(r, c)) {
                    f64::NAN
                } else {
                    self.value(r, c)
                });
                quality.push(self.quality(r, c));
            }
        }

        let mut value = RawArray::new(vec![rows, cols], value);
        if let Some(unit) = &self.unit {
            value = value.with_units(unit.clone());
        }

        MemorySource::new("synthetic")
            .with_array(&paths.latitude, RawArray::new(vec![rows, cols], lat))
            .with_array(&paths.longitude, RawArray::new(vec![rows, cols], lon))
            .with_array(
                &paths.latitude_bounds,
                RawArray::new(vec![rows, cols, 4], lat_b),
            )
            .with_array(
                &paths.longitude_bounds,
                RawArray::new(vec![rows, cols, 4], lon_b),
            )
            .with_array(&paths.value, value)
            .with_array(
                &paths.quality_flag,
                RawArray::new(vec![rows, cols], quality),
            )
    }

    /// Write the swath as a JSON granule into `dir` and return its path.
    pub fn write_json(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        JsonDocument::from_memory(&self.source())
            .save(&path)
            .expect("Failed to write synthetic granule");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swath_grid::{load_swath, LoadOptions};

    #[test]
    fn test_source_loads() {
        let swath = SyntheticSwath::new(3, 4);
        let grids = load_swath(
            &swath.source(),
            &VariablePaths::default(),
            &LoadOptions { with_quality: true },
        )
        .unwrap();

        assert_eq!(grids.rows(), 3);
        assert_eq!(grids.cols(), 4);
        assert_eq!(grids.values().values.get(2, 3), swath.value(2, 3));
        assert_eq!(grids.bounds().corners(1, 1), swath.corners(1, 1));
        assert_eq!(grids.quality().unwrap().get(0, 2), 2.0);
    }

    #[test]
    fn test_nan_overrides() {
        let swath = SyntheticSwath::new(2, 2)
            .with_nan_latitude(1, 0)
            .with_nan_value(0, 1);
        let grids = load_swath(
            &swath.source(),
            &VariablePaths::default(),
            &LoadOptions::default(),
        )
        .unwrap();

        assert!(grids.centers().latitude.get(1, 0).is_nan());
        assert!(grids.centers().longitude.get(1, 0).is_finite());
        assert!(grids.values().values.get(0, 1).is_nan());
    }
}
