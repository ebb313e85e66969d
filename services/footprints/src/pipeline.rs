//! The footprint extraction pipeline.
//!
//! load -> select (-> quality filter) -> build -> raster + vector sinks.

use std::fmt;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use footprint::{build, fan_out, select, ReferencePoint, SinkReport};
use footprint_geojson::{SerializationError, VectorSink};
use renderer::{RasterSink, RenderError};
use swath_grid::{load_swath, open_source, DataSource, LoadOptions};
use tracing::{info, warn};

use crate::config::PipelineConfig;

/// Result of both sinks for one run.
#[derive(Debug)]
pub struct PipelineReport {
    /// Cells in the swath grid.
    pub grid_cells: usize,
    /// Cells that passed selection.
    pub selected: usize,
    pub raster: std::result::Result<SinkReport, RenderError>,
    pub vector: std::result::Result<SinkReport, SerializationError>,
}

impl PipelineReport {
    /// True if both artifacts were written.
    pub fn is_success(&self) -> bool {
        self.raster.is_ok() && self.vector.is_ok()
    }
}

#[derive(Debug)]
pub enum PipelineOutcome {
    /// Footprints were selected and both sinks ran.
    Completed(PipelineReport),
    /// Nothing passed selection; no sink ran and nothing was written.
    EmptySelection {
        reason: EmptyReason,
        reference: Option<ReferencePoint>,
        grid_cells: usize,
    },
}

/// Why a run selected no pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// No cell has finite center coordinates.
    NoLocatedPixels,
    /// No located cell lies within the reference radius.
    OutsideRadius,
    /// Cells were selected, but none passed the quality filter.
    QualityFilter,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            EmptyReason::NoLocatedPixels => "no pixels have finite center coordinates",
            EmptyReason::OutsideRadius => "no pixels found within radius",
            EmptyReason::QualityFilter => "no selected pixels passed the quality filter",
        };
        f.write_str(message)
    }
}

/// Open the configured granule and run the pipeline on it.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutcome> {
    let source = open_source(&config.input)
        .with_context(|| format!("Failed to open granule {}", config.input.display()))?;
    run_with_source(source.as_ref(), config)
}

/// Run the pipeline on an already opened source.
///
/// Grid errors abort the run before any sink starts. Sink errors do not:
/// both sinks always run and their results are returned in the report.
pub fn run_with_source(
    source: &dyn DataSource,
    config: &PipelineConfig,
) -> Result<PipelineOutcome> {
    let start = Instant::now();

    if let Some(flag) = config.max_quality_flag {
        if !flag.is_finite() {
            bail!("max_quality_flag must be a finite number, got {}", flag);
        }
    }

    let options = LoadOptions {
        with_quality: config.max_quality_flag.is_some(),
    };
    let grids = load_swath(source, &config.variables, &options)?;
    let grid_cells = grids.centers().cell_count();

    let mut mask = select(grids.centers(), config.reference.as_ref());
    info!(
        selected = mask.selected(),
        total = grid_cells,
        "Selected pixels"
    );

    let mut reason = match config.reference {
        Some(_) => EmptyReason::OutsideRadius,
        None => EmptyReason::NoLocatedPixels,
    };

    if let (Some(max_flag), Some(quality)) = (config.max_quality_flag, grids.quality()) {
        let before = mask.selected();
        mask = mask.retain_quality(quality, max_flag);
        if before > 0 {
            reason = EmptyReason::QualityFilter;
        }
        info!(
            max_flag = max_flag,
            removed = before - mask.selected(),
            remaining = mask.selected(),
            "Applied quality filter"
        );
    }

    if mask.is_empty() {
        info!(
            reference = ?config.reference,
            max_quality_flag = ?config.max_quality_flag,
            "Empty selection: {}",
            reason
        );
        return Ok(PipelineOutcome::EmptySelection {
            reason,
            reference: config.reference,
            grid_cells,
        });
    }

    let footprints = build(&mask, grids.bounds(), grids.values());

    let raster = RasterSink::new(&config.outputs.raster, config.raster.clone());
    let vector = VectorSink::new(&config.outputs.vector);
    let (raster, vector) = fan_out(&footprints, &raster, &vector);

    let report = PipelineReport {
        grid_cells,
        selected: footprints.len(),
        raster,
        vector,
    };

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    if report.is_success() {
        info!(footprints = report.selected, elapsed_ms = elapsed_ms, "Pipeline complete");
    } else {
        warn!(
            footprints = report.selected,
            elapsed_ms = elapsed_ms,
            "Pipeline finished with sink errors"
        );
    }

    Ok(PipelineOutcome::Completed(report))
}
