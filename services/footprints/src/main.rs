//! Swath footprint extraction CLI.
//!
//! Writes a PNG plot and a GeoJSON file of the pixel footprints of one
//! granule, optionally restricted to a radius around a point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Parser;
use footprint::{ReferencePoint, DEFAULT_RADIUS};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use footprints::{run, FileConfig, PipelineOutcome};

#[derive(Parser, Debug)]
#[command(name = "footprints")]
#[command(about = "Extract satellite pixel footprints into a PNG plot and a GeoJSON file")]
#[command(version)]
struct Args {
    /// Granule to read (.nc, .nc4, .h5, .he5 or a .json array dump)
    file: PathBuf,

    /// Reference latitude in degrees
    #[arg(requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Reference longitude in degrees
    #[arg(allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Selection radius in degrees (planar distance)
    #[arg(default_value_t = DEFAULT_RADIUS)]
    radius: f64,

    /// YAML configuration file
    #[arg(short, long, env = "FOOTPRINTS_CONFIG")]
    config: Option<PathBuf>,

    /// PNG output path
    #[arg(long, env = "FOOTPRINTS_RASTER_OUT")]
    raster_out: Option<PathBuf>,

    /// GeoJSON output path
    #[arg(long, env = "FOOTPRINTS_VECTOR_OUT")]
    vector_out: Option<PathBuf>,

    /// Drop pixels whose quality flag exceeds this value
    #[arg(long, env = "FOOTPRINTS_MAX_QUALITY_FLAG")]
    max_quality_flag: Option<f64>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "FOOTPRINTS_JSON_LOGS")]
    json_logs: bool,
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs);

    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Footprint extraction failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn execute(args: Args) -> Result<ExitCode> {
    let reference = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Some(ReferencePoint::new(lat, lon, args.radius)?),
        (None, None) => None,
        _ => bail!("LAT and LON must be given together"),
    };

    let file_config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let mut config = file_config.into_pipeline(args.file, reference);
    if let Some(path) = args.raster_out {
        config.outputs.raster = path;
    }
    if let Some(path) = args.vector_out {
        config.outputs.vector = path;
    }
    if args.max_quality_flag.is_some() {
        config.max_quality_flag = args.max_quality_flag;
    }

    info!(
        input = %config.input.display(),
        reference = ?config.reference,
        raster = %config.outputs.raster.display(),
        vector = %config.outputs.vector.display(),
        "Starting footprint extraction"
    );

    match run(&config)? {
        PipelineOutcome::EmptySelection { reason, .. } => {
            info!(reason = %reason, "Empty selection, nothing written");
            Ok(ExitCode::SUCCESS)
        }
        PipelineOutcome::Completed(report) => {
            if let Err(e) = &report.raster {
                error!(error = %e, "Raster output failed");
            }
            if let Err(e) = &report.vector {
                error!(error = %e, "Vector output failed");
            }
            Ok(if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
