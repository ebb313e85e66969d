//! Tests for GeoJSON serialization of footprints.

use footprint::{build, select, Footprint, FootprintSet, FootprintSink, Quad};
use footprint_geojson::{serialize, FeatureCollection, SerializationError, VectorSink};
use swath_grid::{load_swath, LoadOptions, VariablePaths};
use test_utils::{scenario_swath, temp_test_dir, SyntheticSwath};

// ============================================================================
// Helper functions
// ============================================================================

fn footprints_of(swath: &SyntheticSwath) -> FootprintSet {
    let grids = load_swath(&swath.source(), &VariablePaths::default(), &LoadOptions::default())
        .unwrap();
    let mask = select(grids.centers(), None);
    build(&mask, grids.bounds(), grids.values())
}

fn unit_square(value: f64) -> Footprint {
    Footprint {
        row: 0,
        col: 0,
        polygon: Quad::new([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
        value,
    }
}

fn read_back(path: &std::path::Path) -> FeatureCollection {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_preserves_order_geometry_and_values() {
    let dir = temp_test_dir();
    let path = dir.path().join("footprints.geojson");
    let swath = SyntheticSwath::new(3, 4).with_nan_value(2, 1);
    let set = footprints_of(&swath);

    serialize(&set, &path).unwrap();
    let parsed = read_back(&path);

    assert_eq!(parsed.type_, "FeatureCollection");
    assert_eq!(parsed.features.len(), set.len());
    for (feature, fp) in parsed.features.iter().zip(set.iter()) {
        assert_eq!(feature.id.as_deref(), Some(format!("r{}c{}", fp.row, fp.col).as_str()));

        let ring = feature.geometry.as_ref().and_then(|g| g.exterior()).unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert_eq!(&ring[..4], fp.polygon.vertices());

        match feature.properties.value {
            Some(v) => assert_eq!(v.to_bits(), fp.value.to_bits()),
            None => assert!(fp.value.is_nan()),
        }
    }
    assert_eq!(parsed.features[9].properties.value, None);
}

#[test]
fn test_awkward_values_are_bit_exact() {
    let dir = temp_test_dir();
    let path = dir.path().join("values.geojson");
    let values = [0.1 + 0.2, 1.0e-300, -2.2250738585072014e-308, 6.02214076e23, 1.0 / 3.0];
    let set = FootprintSet::new(values.iter().map(|&v| unit_square(v)).collect(), None);

    serialize(&set, &path).unwrap();
    let parsed = read_back(&path);

    for (feature, expected) in parsed.features.iter().zip(values) {
        assert_eq!(feature.properties.value.unwrap().to_bits(), expected.to_bits());
    }
}

#[test]
fn test_raw_json_uses_null_for_missing_values() {
    let dir = temp_test_dir();
    let path = dir.path().join("nan.geojson");
    let set = FootprintSet::new(vec![unit_square(f64::NAN), unit_square(1.5)], None);

    serialize(&set, &path).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();

    assert!(json["features"][0]["properties"]["value"].is_null());
    assert_eq!(json["features"][1]["properties"]["value"], 1.5);
    assert!(!std::fs::read_to_string(&path).unwrap().contains("NaN"));
}

// ============================================================================
// Edge cases
// ============================================================================

#[test]
fn test_empty_input_writes_empty_collection() {
    let dir = temp_test_dir();
    let path = dir.path().join("empty.geojson");

    serialize(&FootprintSet::default(), &path).unwrap();
    let parsed = read_back(&path);
    assert_eq!(parsed.type_, "FeatureCollection");
    assert!(parsed.features.is_empty());
}

#[test]
fn test_non_finite_vertex_keeps_feature_with_null_geometry() {
    let dir = temp_test_dir();
    let path = dir.path().join("bad.geojson");
    let mut bad = unit_square(2.0);
    bad.row = 4;
    bad.col = 2;
    bad.polygon = Quad::new([[0.0, 0.0], [1.0, f64::INFINITY], [1.0, 1.0], [0.0, 1.0]]);
    let set = FootprintSet::new(vec![unit_square(1.0), bad, unit_square(3.0)], None);

    serialize(&set, &path).unwrap();
    let parsed = read_back(&path);

    assert_eq!(parsed.features.len(), 3);
    assert!(parsed.features[0].geometry.is_some());
    assert!(parsed.features[1].geometry.is_none());
    assert_eq!(parsed.features[1].id.as_deref(), Some("r4c2"));
    assert_eq!(parsed.features[1].properties.value, Some(2.0));
    assert_eq!(parsed.features[2].properties.value, Some(3.0));

    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert!(json["features"][1]["geometry"].is_null());
    assert!(!std::fs::read_to_string(&path).unwrap().contains("inf"));
}

#[test]
fn test_unwritable_path() {
    let dir = temp_test_dir();
    let path = dir.path().join("no").join("such").join("dir.geojson");

    let err = serialize(&footprints_of(&scenario_swath()), &path).unwrap_err();
    assert!(matches!(err, SerializationError::Io { .. }));
    assert!(err.to_string().contains("dir.geojson"));
}

#[test]
fn test_sink_report() {
    let dir = temp_test_dir();
    let path = dir.path().join("sink.geojson");
    let sink = VectorSink::new(&path);

    let report = sink.write(&footprints_of(&scenario_swath())).unwrap();
    assert_eq!(report.sink, "vector");
    assert_eq!(report.features, 4);
    assert_eq!(report.bytes, std::fs::metadata(&path).unwrap().len());
    assert_eq!(read_back(&path).features.len(), 4);
}

#[test]
fn test_overwrites_existing_file() {
    let dir = temp_test_dir();
    let path = dir.path().join("again.geojson");
    std::fs::write(&path, "stale").unwrap();

    serialize(&footprints_of(&scenario_swath()), &path).unwrap();
    assert_eq!(read_back(&path).features.len(), 4);
}
