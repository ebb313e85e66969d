//! End-to-end runs of the footprint pipeline on JSON granules.

use std::path::Path;

use footprint::ReferencePoint;
use footprints::{
    run, run_with_source, EmptyReason, PipelineConfig, PipelineOutcome, PipelineReport,
};
use renderer::RenderError;
use swath_grid::GridError;
use test_utils::{
    nan_latitude_swath, scenario_swath, temp_test_dir, SyntheticSwath, FAR_AWAY, ORIGIN,
};

// ============================================================================
// Helper functions
// ============================================================================

fn config_in(dir: &Path, input: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::new(input);
    config.outputs.raster = dir.join("fp.png");
    config.outputs.vector = dir.join("fp.geojson");
    config.raster.width = 400;
    config.raster.height = 300;
    config
}

fn completed(outcome: PipelineOutcome) -> PipelineReport {
    match outcome {
        PipelineOutcome::Completed(report) => report,
        other => panic!("expected a completed run, got {other:?}"),
    }
}

fn feature_ids(path: &Path) -> Vec<String> {
    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    json["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_all_pixels_without_reference() {
    let dir = temp_test_dir();
    let input = scenario_swath().write_json(dir.path(), "granule.json");
    let config = config_in(dir.path(), &input);

    let report = completed(run(&config).unwrap());
    assert!(report.is_success());
    assert_eq!(report.grid_cells, 4);
    assert_eq!(report.selected, 4);
    assert_eq!(report.vector.as_ref().unwrap().features, 4);
    assert_eq!(report.raster.as_ref().unwrap().features, 4);
    assert_eq!(
        feature_ids(&config.outputs.vector),
        vec!["r0c0", "r0c1", "r1c0", "r1c1"]
    );
    assert!(config.outputs.raster.exists());
}

#[test]
fn test_zero_radius_at_cell_center_selects_one_pixel() {
    let dir = temp_test_dir();
    let input = scenario_swath().write_json(dir.path(), "granule.json");
    let mut config = config_in(dir.path(), &input);
    config.reference = Some(ReferencePoint::new(ORIGIN.0, ORIGIN.1, 0.0).unwrap());

    let report = completed(run(&config).unwrap());
    assert_eq!(report.selected, 1);
    assert_eq!(report.raster.as_ref().unwrap().features, 1);
    assert_eq!(feature_ids(&config.outputs.vector), vec!["r0c0"]);
}

#[test]
fn test_far_reference_writes_nothing() {
    let dir = temp_test_dir();
    let input = scenario_swath().write_json(dir.path(), "granule.json");
    let mut config = config_in(dir.path(), &input);
    let reference = ReferencePoint::with_default_radius(FAR_AWAY.0, FAR_AWAY.1).unwrap();
    config.reference = Some(reference);

    match run(&config).unwrap() {
        PipelineOutcome::EmptySelection {
            reason,
            reference: r,
            grid_cells,
        } => {
            assert_eq!(reason, EmptyReason::OutsideRadius);
            assert_eq!(r, Some(reference));
            assert_eq!(grid_cells, 4);
        }
        other => panic!("expected an empty selection, got {other:?}"),
    }
    assert!(!config.outputs.raster.exists());
    assert!(!config.outputs.vector.exists());
}

#[test]
fn test_nan_latitude_pixel_is_excluded() {
    let dir = temp_test_dir();
    let input = nan_latitude_swath().write_json(dir.path(), "granule.json");
    let config = config_in(dir.path(), &input);

    let report = completed(run(&config).unwrap());
    assert_eq!(report.selected, 3);
    assert_eq!(
        feature_ids(&config.outputs.vector),
        vec!["r0c0", "r0c1", "r1c1"]
    );
}

// ============================================================================
// Options and failures
// ============================================================================

#[test]
fn test_quality_filter() {
    let dir = temp_test_dir();
    let input = SyntheticSwath::new(2, 3).write_json(dir.path(), "granule.json");
    let mut config = config_in(dir.path(), &input);
    config.max_quality_flag = Some(1.0);

    let report = completed(run(&config).unwrap());
    assert_eq!(report.grid_cells, 6);
    // quality = col % 3, so column 2 goes
    assert_eq!(report.selected, 4);
}

#[test]
fn test_quality_filter_can_empty_the_selection() {
    let dir = temp_test_dir();
    let swath = SyntheticSwath::new(2, 3);
    let mut config = config_in(dir.path(), Path::new("unused.json"));
    config.max_quality_flag = Some(-1.0);

    let outcome = run_with_source(&swath.source(), &config).unwrap();
    assert!(matches!(
        outcome,
        PipelineOutcome::EmptySelection {
            reason: EmptyReason::QualityFilter,
            ..
        }
    ));
}

#[test]
fn test_no_located_pixels_without_reference() {
    let dir = temp_test_dir();
    let mut source = scenario_swath().source();
    let mut latitude = source.remove("geolocation/latitude").unwrap();
    latitude.data.iter_mut().for_each(|v| *v = f64::NAN);
    source.insert("geolocation/latitude", latitude);
    let config = config_in(dir.path(), Path::new("unused.json"));

    match run_with_source(&source, &config).unwrap() {
        PipelineOutcome::EmptySelection { reason, .. } => {
            assert_eq!(reason, EmptyReason::NoLocatedPixels);
            assert_eq!(reason.to_string(), "no pixels have finite center coordinates");
        }
        other => panic!("expected an empty selection, got {other:?}"),
    }
    assert!(!config.outputs.vector.exists());
}

#[test]
fn test_bad_corner_keeps_both_artifacts_aligned() {
    let dir = temp_test_dir();
    let mut source = scenario_swath().source();
    let mut bounds = source.remove("geolocation/latitude_bounds").unwrap();
    // corner 1 of cell (1, 1) in a 2 x 2 x 4 array
    bounds.data[13] = f64::NAN;
    source.insert("geolocation/latitude_bounds", bounds);
    let config = config_in(dir.path(), Path::new("unused.json"));

    let report = completed(run_with_source(&source, &config).unwrap());
    assert!(report.is_success());
    assert_eq!(report.raster.as_ref().unwrap().features, 3);
    assert_eq!(report.vector.as_ref().unwrap().features, 4);

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&config.outputs.vector).unwrap()).unwrap();
    assert!(json["features"][3]["geometry"].is_null());
    assert_eq!(json["features"][3]["id"], "r1c1");
    assert_eq!(
        feature_ids(&config.outputs.vector),
        vec!["r0c0", "r0c1", "r1c0", "r1c1"]
    );
}

#[test]
fn test_missing_variable_is_fatal() {
    let dir = temp_test_dir();
    let mut source = scenario_swath().source();
    source.remove("geolocation/latitude_bounds");
    let config = config_in(dir.path(), Path::new("unused.json"));

    let err = run_with_source(&source, &config).unwrap_err();
    match err.downcast_ref::<GridError>() {
        Some(GridError::DataMissing { variable, .. }) => {
            assert_eq!(variable, "geolocation/latitude_bounds")
        }
        other => panic!("expected DataMissing, got {other:?}"),
    }
    assert!(!config.outputs.vector.exists());
}

#[test]
fn test_unknown_input_format() {
    let dir = temp_test_dir();
    let input = dir.path().join("granule.txt");
    std::fs::write(&input, "not a granule").unwrap();

    let err = run(&config_in(dir.path(), &input)).unwrap_err();
    assert!(format!("{err:#}").contains("granule.txt"));
}

#[test]
fn test_one_sink_failing_does_not_stop_the_other() {
    let dir = temp_test_dir();
    let input = scenario_swath().write_json(dir.path(), "granule.json");
    let mut config = config_in(dir.path(), &input);
    config.outputs.raster = dir.path().join("missing_dir").join("fp.png");

    let report = completed(run(&config).unwrap());
    assert!(!report.is_success());
    assert!(matches!(report.raster, Err(RenderError::Io { .. })));
    assert_eq!(report.vector.as_ref().unwrap().features, 4);
    assert_eq!(feature_ids(&config.outputs.vector).len(), 4);
}
