//! Sensor Summary Module
//! Descriptive statistics for the dashboard's sensor cards and the defect rate.

use crate::config::DashboardConfig;
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use tracing::warn;

/// Column holding the inspection verdict, 1 for a rejected part.
pub const PASS_FAIL_COLUMN: &str = "passorfail";

/// Statistics for a single sensor column.
#[derive(Debug, Clone, Serialize)]
pub struct SensorSummary {
    pub column: String,
    pub label: String,
    pub count: usize,
    /// Last non-null reading, i.e. the most recent one in replay order.
    pub latest: Option<f64>,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p05: f64,
    pub p95: f64,
}

impl SensorSummary {
    fn empty(column: &str, label: String) -> Self {
        Self {
            column: column.to_string(),
            label,
            count: 0,
            latest: None,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            p05: f64::NAN,
            p95: f64::NAN,
        }
    }
}

/// Inspected and rejected part counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DefectRate {
    pub inspected: usize,
    pub failed: usize,
    /// Failed share in percent, 0 when nothing was inspected.
    pub rate: f64,
}

/// Compute a summary from raw readings, in arrival order.
pub fn describe(column: &str, label: String, values: &[f64]) -> SensorSummary {
    let n = values.len();
    if n == 0 {
        return SensorSummary::empty(column, label);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let variance = if n > 1 { values.iter().variance() } else { 0.0 };

    SensorSummary {
        column: column.to_string(),
        label,
        count: n,
        latest: values.last().copied(),
        mean: values.iter().mean(),
        median,
        std: variance.sqrt(),
        min: sorted[0],
        max: sorted[n - 1],
        p05: percentile(&sorted, 5.0),
        p95: percentile(&sorted, 95.0),
    }
}

/// Percentile with linear interpolation between closest ranks.
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

/// Numeric readings of a column, nulls and NaNs skipped.
pub fn numeric_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<f64>> {
    let values = df.column(column)?.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

/// Summaries for every labelled sensor present in the table, in label order.
pub fn summarize_sensors(df: &DataFrame, config: &DashboardConfig) -> Vec<SensorSummary> {
    let columns: Vec<&String> = config
        .sensor_labels
        .keys()
        .filter(|c| df.column(c.as_str()).is_ok())
        .collect();

    columns
        .par_iter()
        .map(|column| {
            let values = numeric_values(df, column).unwrap_or_else(|e| {
                warn!(column = column.as_str(), error = %e, "sensor column is not numeric");
                Vec::new()
            });
            describe(column, config.display_label(column), &values)
        })
        .collect()
}

/// Share of rejected parts; `None` if the table has no verdict column.
pub fn defect_rate(df: &DataFrame, column: &str) -> Option<DefectRate> {
    let verdicts = numeric_values(df, column).ok()?;
    let inspected = verdicts.len();
    let failed = verdicts.iter().filter(|v| **v == 1.0).count();
    let rate = if inspected > 0 {
        failed as f64 / inspected as f64 * 100.0
    } else {
        0.0
    };

    Some(DefectRate {
        inspected,
        failed,
        rate,
    })
}
