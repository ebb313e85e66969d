//! Vector output of the footprint pipeline.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use footprint::{FootprintSet, FootprintSink, SinkReport};
use tracing::{debug, info};

use crate::error::{Result, SerializationError};
use crate::geojson::FeatureCollection;

/// Write footprints as a GeoJSON FeatureCollection at `output_path`.
///
/// Empty input still produces a valid, empty collection, and footprints with
/// a non-finite vertex keep their feature with a `null` geometry. The file is written
/// to a temporary sibling first and moved into place once complete, so a
/// failure never leaves a truncated document behind.
///
/// Returns the number of bytes written.
pub fn serialize(footprints: &FootprintSet, output_path: &Path) -> Result<u64> {
    let collection = FeatureCollection::from_footprints(footprints);
    let unlocated = collection.unlocated();
    if unlocated > 0 {
        debug!(unlocated, "Footprints with non-finite vertices written without geometry");
    }

    let io_err = |source| SerializationError::Io {
        path: output_path.to_path_buf(),
        source,
    };

    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;

    let mut writer = BufWriter::new(tmp);
    serde_json::to_writer(&mut writer, &collection)?;
    writer.write_all(b"\n").map_err(io_err)?;
    let tmp = writer.into_inner().map_err(|e| io_err(e.into_error()))?;

    tmp.as_file().sync_all().map_err(io_err)?;
    let file = tmp.persist(output_path).map_err(|e| io_err(e.error))?;
    let bytes = file.metadata().map_err(io_err)?.len();

    info!(
        path = %output_path.display(),
        features = collection.features.len(),
        unlocated = unlocated,
        bytes = bytes,
        "Wrote footprint GeoJSON"
    );
    Ok(bytes)
}

/// GeoJSON sink writing to a fixed path.
#[derive(Debug, Clone)]
pub struct VectorSink {
    path: PathBuf,
}

impl VectorSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FootprintSink for VectorSink {
    type Error = SerializationError;

    fn name(&self) -> &'static str {
        "vector"
    }

    fn write(&self, footprints: &FootprintSet) -> Result<SinkReport> {
        let bytes = serialize(footprints, &self.path)?;
        Ok(SinkReport {
            sink: self.name(),
            path: self.path.clone(),
            features: footprints.len(),
            bytes,
        })
    }
}
