//! Source Tables
//! The baseline and streaming datasets, loaded once and shared read-only.

use super::loader::{DataLoader, LoaderError};
use super::table::{column_names, common_columns, missing_columns, project};
use crate::config::DashboardConfig;
use polars::prelude::*;
use tracing::info;

/// Immutable datasets every stream session is built from.
///
/// DataFrame columns are reference counted, so cloning a table here is
/// cheap and never exposes a mutable handle to the stored data.
#[derive(Debug, Clone)]
pub struct SourceTables {
    baseline: DataFrame,
    streaming: DataFrame,
    selected: DataFrame,
    common_columns: Vec<String>,
}

impl SourceTables {
    /// Build from already loaded tables.
    ///
    /// Fails with [`LoaderError::MissingColumns`] if the streaming table lacks
    /// any of `selected_columns`.
    pub fn new(
        baseline: DataFrame,
        streaming: DataFrame,
        selected_columns: &[String],
    ) -> Result<Self, LoaderError> {
        let missing = missing_columns(&streaming, selected_columns);
        if !missing.is_empty() {
            return Err(LoaderError::MissingColumns(missing));
        }

        let selected = project(&streaming, selected_columns)?;
        let common_columns = common_columns(&baseline, &streaming);

        Ok(Self {
            baseline,
            streaming,
            selected,
            common_columns,
        })
    }

    /// Load both datasets named by the configuration.
    pub fn load(config: &DashboardConfig) -> Result<Self, LoaderError> {
        let baseline = DataLoader::with_encodings(&config.static_encodings)?
            .load_csv(config.static_path())?;
        let streaming = DataLoader::with_encodings(&config.streaming_encodings)?
            .load_csv(config.streaming_path())?;

        let tables = Self::new(baseline, streaming, &config.selected_columns)?;
        info!(
            baseline_rows = tables.baseline.height(),
            replay_rows = tables.selected.height(),
            shared_columns = tables.common_columns.len(),
            "source tables ready"
        );
        Ok(tables)
    }

    /// The static baseline dataset.
    pub fn baseline(&self) -> &DataFrame {
        &self.baseline
    }

    /// The full streaming dataset, before projection.
    pub fn streaming(&self) -> &DataFrame {
        &self.streaming
    }

    /// The streaming dataset restricted to the selected columns.
    pub fn selected(&self) -> &DataFrame {
        &self.selected
    }

    pub fn selected_columns(&self) -> Vec<String> {
        column_names(&self.selected)
    }

    /// Columns shared by the baseline and streaming datasets, sorted by name.
    pub fn common_columns(&self) -> &[String] {
        &self.common_columns
    }

    /// Baseline restricted to the shared columns; the seed for accumulation.
    pub fn accumulation_seed(&self) -> PolarsResult<DataFrame> {
        project(&self.baseline, &self.common_columns)
    }
}
