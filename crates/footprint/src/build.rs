//! Footprint polygon reconstruction.
//!
//! Each selected pixel becomes a quadrilateral built from its four corner
//! coordinates exactly as stored in the bounds arrays (k = 0..3). The vertex
//! order is kept verbatim: no winding correction, no convexity check. The
//! ring is implicitly closed.

use swath_grid::{BoundsGrid, ValueGrid, CORNERS};
use tracing::debug;

use crate::select::SelectionMask;

/// A pixel outline: four `[lon, lat]` vertices in source order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    vertices: [[f64; 2]; CORNERS],
}

impl Quad {
    pub fn new(vertices: [[f64; 2]; CORNERS]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[[f64; 2]; CORNERS] {
        &self.vertices
    }

    /// The ring with the first vertex repeated at the end.
    pub fn closed_ring(&self) -> [[f64; 2]; CORNERS + 1] {
        let v = &self.vertices;
        [v[0], v[1], v[2], v[3], v[0]]
    }

    /// True if every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.vertices.iter().flatten().all(|c| c.is_finite())
    }
}

/// One selected pixel: its outline and measured value.
///
/// `value` is passed through untouched and may be NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub row: usize,
    pub col: usize,
    pub polygon: Quad,
    pub value: f64,
}

/// Lon/lat bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Grow each side by `fraction` of the extent's size.
    ///
    /// A zero-sized axis is padded by `fraction` degrees instead so that a
    /// single point still spans something.
    pub fn padded(&self, fraction: f64) -> Self {
        let pad_lon = if self.width() > 0.0 {
            self.width() * fraction
        } else {
            fraction
        };
        let pad_lat = if self.height() > 0.0 {
            self.height() * fraction
        } else {
            fraction
        };
        Self {
            min_lon: self.min_lon - pad_lon,
            min_lat: self.min_lat - pad_lat,
            max_lon: self.max_lon + pad_lon,
            max_lat: self.max_lat + pad_lat,
        }
    }
}

/// The ordered footprints of one run, shared read-only by every sink.
///
/// Order is row-major over the grid, so footprint `n` is the same pixel in
/// every artifact produced from this set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FootprintSet {
    footprints: Vec<Footprint>,
    unit: Option<String>,
}

impl FootprintSet {
    pub fn new(footprints: Vec<Footprint>, unit: Option<String>) -> Self {
        Self { footprints, unit }
    }

    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Footprint> {
        self.footprints.iter()
    }

    pub fn as_slice(&self) -> &[Footprint] {
        &self.footprints
    }

    /// Physical unit of the values, if the source declared one.
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Min and max of the finite values, `None` if there are none.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.footprints
            .iter()
            .map(|f| f.value)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Bounding box of all finite vertices, `None` if there are none.
    pub fn extent(&self) -> Option<Extent> {
        let mut extent: Option<Extent> = None;
        for [lon, lat] in self.footprints.iter().flat_map(|f| *f.polygon.vertices()) {
            if !lon.is_finite() || !lat.is_finite() {
                continue;
            }
            extent = Some(match extent {
                None => Extent {
                    min_lon: lon,
                    min_lat: lat,
                    max_lon: lon,
                    max_lat: lat,
                },
                Some(e) => Extent {
                    min_lon: e.min_lon.min(lon),
                    min_lat: e.min_lat.min(lat),
                    max_lon: e.max_lon.max(lon),
                    max_lat: e.max_lat.max(lat),
                },
            });
        }
        extent
    }
}

impl<'a> IntoIterator for &'a FootprintSet {
    type Item = &'a Footprint;
    type IntoIter = std::slice::Iter<'a, Footprint>;

    fn into_iter(self) -> Self::IntoIter {
        self.footprints.iter()
    }
}

/// Build one footprint per selected cell, in row-major order.
///
/// The mask must come from the same swath as `bounds` and `values`; shapes
/// were validated when the swath was loaded.
pub fn build(mask: &SelectionMask, bounds: &BoundsGrid, values: &ValueGrid) -> FootprintSet {
    debug_assert_eq!(
        [mask.rows(), mask.cols()],
        values.values.shape(),
        "selection mask does not belong to this swath"
    );

    let mut footprints = Vec::with_capacity(mask.selected());
    for (row, col) in mask.iter_selected() {
        footprints.push(Footprint {
            row,
            col,
            polygon: Quad::new(bounds.corners(row, col)),
            value: values.values.get(row, col),
        });
    }

    debug!(footprints = footprints.len(), "Built footprint polygons");

    FootprintSet::new(footprints, values.unit.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Quad {
        Quad::new([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]])
    }

    #[test]
    fn test_closed_ring_repeats_first_vertex() {
        let ring = quad().closed_ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert_eq!(ring[2], [1.0, 1.0]);
    }

    #[test]
    fn test_quad_is_finite() {
        assert!(quad().is_finite());
        let bad = Quad::new([[0.0, f64::NAN], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        assert!(!bad.is_finite());
    }

    #[test]
    fn test_value_range_ignores_nan() {
        let mk = |value| Footprint {
            row: 0,
            col: 0,
            polygon: quad(),
            value,
        };
        let set = FootprintSet::new(vec![mk(3.0), mk(f64::NAN), mk(-1.0)], None);
        assert_eq!(set.value_range(), Some((-1.0, 3.0)));

        let all_nan = FootprintSet::new(vec![mk(f64::NAN)], None);
        assert_eq!(all_nan.value_range(), None);
    }

    #[test]
    fn test_extent_and_padding() {
        let set = FootprintSet::new(
            vec![Footprint {
                row: 0,
                col: 0,
                polygon: quad(),
                value: 1.0,
            }],
            None,
        );
        let extent = set.extent().unwrap();
        assert_eq!(extent.width(), 1.0);

        let padded = extent.padded(0.5);
        assert_eq!(padded.min_lon, -0.5);
        assert_eq!(padded.max_lat, 1.5);
    }
}
