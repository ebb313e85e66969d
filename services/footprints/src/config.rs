//! Pipeline configuration.
//!
//! Settings come from three layers, later ones winning:
//! built-in defaults, an optional YAML file, then command-line flags and
//! environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use footprint::ReferencePoint;
use renderer::RasterConfig;
use serde::{Deserialize, Serialize};
use swath_grid::VariablePaths;

/// Where the two artifacts are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputPaths {
    pub raster: PathBuf,
    pub vector: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            raster: PathBuf::from("no2_footprints.png"),
            vector: PathBuf::from("no2_footprints.geojson"),
        }
    }
}

/// Contents of the YAML configuration file. Every field is optional.
///
/// ```yaml
/// variables:
///   value: product/vertical_column_stratosphere
/// raster:
///   title: TEMPO NO2 stratospheric column
/// outputs:
///   vector: out/footprints.geojson
/// max_quality_flag: 0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub variables: VariablePaths,
    pub raster: RasterConfig,
    pub outputs: OutputPaths,
    pub max_quality_flag: Option<f64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn into_pipeline(
        self,
        input: PathBuf,
        reference: Option<ReferencePoint>,
    ) -> PipelineConfig {
        PipelineConfig {
            input,
            reference,
            variables: self.variables,
            raster: self.raster,
            outputs: self.outputs,
            max_quality_flag: self.max_quality_flag,
        }
    }
}

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Granule to read.
    pub input: PathBuf,
    /// Restrict selection to a radius around this point.
    pub reference: Option<ReferencePoint>,
    pub variables: VariablePaths,
    pub raster: RasterConfig,
    pub outputs: OutputPaths,
    /// Keep only pixels whose quality flag is at most this value.
    pub max_quality_flag: Option<f64>,
}

impl PipelineConfig {
    /// Defaults for `input`, selecting every pixel.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        FileConfig::default().into_pipeline(input.into(), None)
    }
}
