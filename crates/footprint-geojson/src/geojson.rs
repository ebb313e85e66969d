//! GeoJSON types for footprint output (RFC 7946).
//!
//! Only the subset needed for footprints is modelled: a FeatureCollection of
//! Polygon features with a single numeric property. A footprint whose corners
//! are not all finite keeps its feature with a `null` geometry, so feature N
//! is always footprint N.

use serde::{Deserialize, Serialize};

use footprint::{Footprint, FootprintSet};

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    /// One feature per footprint, in the same order.
    pub fn from_footprints(footprints: &FootprintSet) -> Self {
        Self {
            features: footprints.iter().map(Feature::from_footprint).collect(),
            ..Self::new()
        }
    }

    /// Number of features without a geometry.
    pub fn unlocated(&self) -> usize {
        self.features.iter().filter(|f| f.geometry.is_none()).count()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// `null` when the footprint has no representable outline.
    pub geometry: Option<Geometry>,

    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Option<Geometry>) -> Self {
        Self {
            type_: "Feature".to_string(),
            id: None,
            geometry,
            properties: Properties::default(),
        }
    }

    pub fn polygon(ring: Vec<[f64; 2]>) -> Self {
        Self::new(Some(Geometry::polygon(vec![ring])))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Feature for one footprint.
    ///
    /// GeoJSON positions must be numbers, so a polygon with a NaN or infinite
    /// vertex is written as a `null` geometry. The id and value are kept.
    pub fn from_footprint(fp: &Footprint) -> Self {
        let geometry = fp
            .polygon
            .is_finite()
            .then(|| Geometry::polygon(vec![fp.polygon.closed_ring().to_vec()]));
        Self::new(geometry)
            .with_id(feature_id(fp.row, fp.col))
            .with_properties(Properties::from_value(fp.value))
    }
}

/// Stable feature id of a grid cell.
pub fn feature_id(row: usize, col: usize) -> String {
    format!("r{}c{}", row, col)
}

/// GeoJSON geometry types used for footprints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Linear rings of `[lon, lat]` positions; the first is the exterior.
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

impl Geometry {
    pub fn polygon(coordinates: Vec<Vec<[f64; 2]>>) -> Self {
        Geometry::Polygon { coordinates }
    }

    /// The exterior ring.
    pub fn exterior(&self) -> Option<&[[f64; 2]]> {
        match self {
            Geometry::Polygon { coordinates } => coordinates.first().map(Vec::as_slice),
        }
    }
}

/// Feature properties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Properties {
    /// Measured value; `null` when missing.
    pub value: Option<f64>,
}

impl Properties {
    /// NaN and infinities become `None`, which serializes as `null`.
    pub fn from_value(value: f64) -> Self {
        Self {
            value: value.is_finite().then_some(value),
        }
    }
}
