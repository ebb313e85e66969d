//! JSON array dumps.
//!
//! A small self-describing container used for fixtures and for granules
//! exported from other tools:
//!
//! ```json
//! {
//!   "variables": {
//!     "geolocation/latitude": { "shape": [2, 2], "data": [40.0, 40.0, 40.1, null] },
//!     "product/vertical_column_troposphere": {
//!       "shape": [2, 2], "data": [1.0e15, 2.0e15, null, 3.0e15], "units": "molecules/cm^2"
//!     }
//!   }
//! }
//! ```
//!
//! `null` entries are missing values and decode to NaN. Infinities are
//! written as the strings `"inf"` and `"-inf"`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::array::{element_count, RawArray};
use crate::error::{GridError, GridResult};
use crate::source::{normalize_path, DataSource, MemorySource};

/// On-disk layout of a JSON array dump.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonDocument {
    pub variables: BTreeMap<String, JsonVariable>,
}

/// One variable in a [`JsonDocument`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonVariable {
    pub shape: Vec<usize>,
    pub data: Vec<Option<JsonNumber>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// A data entry: a JSON number, or an infinity spelled as a string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonNumber {
    Finite(f64),
    Infinite(Infinity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Infinity {
    #[serde(rename = "inf")]
    Positive,
    #[serde(rename = "-inf")]
    Negative,
}

impl JsonNumber {
    /// `None` for NaN, which is written as `null`.
    pub fn encode(value: f64) -> Option<Self> {
        if value.is_nan() {
            None
        } else if value == f64::INFINITY {
            Some(JsonNumber::Infinite(Infinity::Positive))
        } else if value == f64::NEG_INFINITY {
            Some(JsonNumber::Infinite(Infinity::Negative))
        } else {
            Some(JsonNumber::Finite(value))
        }
    }

    pub fn decode(entry: Option<Self>) -> f64 {
        match entry {
            None => f64::NAN,
            Some(JsonNumber::Finite(v)) => v,
            Some(JsonNumber::Infinite(Infinity::Positive)) => f64::INFINITY,
            Some(JsonNumber::Infinite(Infinity::Negative)) => f64::NEG_INFINITY,
        }
    }
}

impl From<&RawArray> for JsonVariable {
    fn from(array: &RawArray) -> Self {
        Self {
            shape: array.shape.clone(),
            data: array.data.iter().map(|&v| JsonNumber::encode(v)).collect(),
            units: array.units.clone(),
        }
    }
}

impl JsonDocument {
    /// Snapshot every array held by a [`MemorySource`].
    pub fn from_memory(source: &MemorySource) -> Self {
        let variables = source
            .arrays()
            .iter()
            .map(|(name, array)| (name.clone(), JsonVariable::from(array)))
            .collect();
        Self { variables }
    }

    /// Write the document to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> GridResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)
            .map_err(|e| GridError::InvalidFormat(format!("Failed to encode JSON: {}", e)))?;
        writer.flush()?;
        Ok(())
    }
}

/// Data source backed by a JSON array dump.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
    document: JsonDocument,
}

impl JsonSource {
    pub fn open(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = BufReader::new(File::open(&path)?);
        let document: JsonDocument = serde_json::from_reader(reader).map_err(|e| {
            GridError::InvalidFormat(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Self { path, document })
    }

    pub fn from_document(path: impl Into<PathBuf>, document: JsonDocument) -> Self {
        Self {
            path: path.into(),
            document,
        }
    }
}

impl DataSource for JsonSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_array(&self, path: &str) -> GridResult<Option<RawArray>> {
        let Some(variable) = self.document.variables.get(normalize_path(path)) else {
            return Ok(None);
        };

        let Some(expected) = element_count(&variable.shape) else {
            return Err(GridError::InvalidFormat(format!(
                "variable '{}' declares shape {:?}, which is too large",
                path, variable.shape
            )));
        };
        if variable.data.len() != expected {
            return Err(GridError::InvalidFormat(format!(
                "variable '{}' declares shape {:?} ({} values) but holds {} values",
                path,
                variable.shape,
                expected,
                variable.data.len()
            )));
        }

        let data = variable.data.iter().map(|&v| JsonNumber::decode(v)).collect();
        let mut array = RawArray::new(variable.shape.clone(), data);
        array.units = variable.units.clone();
        Ok(Some(array))
    }
}
