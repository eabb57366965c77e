//! Dashboard Configuration Module
//! Data file locations, encoding chains, replay column selection and sensor labels.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Rows pulled per replay step when the caller does not say otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Human readable name and unit of a sensor column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorLabel {
    pub name: String,
    pub unit: String,
}

impl SensorLabel {
    pub fn new(name: &str, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
        }
    }
}

/// Static dashboard configuration.
///
/// Every field falls back to the values the casting line dashboard ships
/// with, so a partial JSON file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory the data files are resolved against.
    pub data_dir: PathBuf,
    /// Baseline dataset used to seed accumulation.
    pub static_file: PathBuf,
    /// Dataset replayed row by row.
    pub streaming_file: PathBuf,
    /// Encodings tried in order when decoding the baseline file.
    pub static_encodings: Vec<String>,
    /// Encodings tried in order when decoding the streaming file.
    pub streaming_encodings: Vec<String>,
    /// Streaming columns kept for replay, in output order.
    pub selected_columns: Vec<String>,
    pub sensor_labels: BTreeMap<String, SensorLabel>,
    pub default_batch_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let sensor_labels = [
            ("molten_temp", SensorLabel::new("용탕온도", "°C")),
            ("cast_pressure", SensorLabel::new("주조압력", "bar")),
            ("high_section_speed", SensorLabel::new("고속구간속도", "mm/s")),
            ("low_section_speed", SensorLabel::new("저속구간속도", "mm/s")),
        ]
        .into_iter()
        .map(|(col, label)| (col.to_string(), label))
        .collect();

        Self {
            data_dir: PathBuf::from("data"),
            static_file: PathBuf::from("df_final.csv"),
            streaming_file: PathBuf::from("streaming_df.csv"),
            static_encodings: vec!["utf-8".to_string(), "ISO-8859-1".to_string()],
            streaming_encodings: vec!["utf-8".to_string(), "cp949".to_string()],
            selected_columns: [
                "registration_time",
                "molten_temp",
                "cast_pressure",
                "high_section_speed",
                "low_section_speed",
                "biscuit_thickness",
                "passorfail",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            sensor_labels,
            default_batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selected_columns.is_empty() {
            return Err(ConfigError::Invalid(
                "selected_columns must not be empty".to_string(),
            ));
        }
        if self.static_encodings.is_empty() || self.streaming_encodings.is_empty() {
            return Err(ConfigError::Invalid(
                "encoding chains must name at least one encoding".to_string(),
            ));
        }
        if self.default_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "default_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn static_path(&self) -> PathBuf {
        self.data_dir.join(&self.static_file)
    }

    pub fn streaming_path(&self) -> PathBuf {
        self.data_dir.join(&self.streaming_file)
    }

    /// Get the label registered for a column.
    pub fn label_for(&self, column: &str) -> Option<&SensorLabel> {
        self.sensor_labels.get(column)
    }

    /// Display text for a column, e.g. "용탕온도 (°C)".
    /// Unlabelled columns are shown by their raw name.
    pub fn display_label(&self, column: &str) -> String {
        match self.label_for(column) {
            Some(label) if label.unit.is_empty() => label.name.clone(),
            Some(label) => format!("{} ({})", label.name, label.unit),
            None => column.to_string(),
        }
    }
}
