//! Stream Accumulator
//! Keeps a growing table of baseline rows plus every batch pushed into it.

use crate::data::table::column_names;
use polars::prelude::*;
use polars_core::utils::try_get_supertype;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a batch could not be appended. Logged, never returned to callers.
/// Chunk count past which the accumulated table is compacted.
const MAX_CHUNKS: usize = 64;

fn is_numeric(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float()
}

#[derive(Error, Debug)]
pub enum AccumulateError {
    #[error("batch shares no columns with the accumulated table")]
    NoSharedColumns,
    #[error("column {column}: cannot cast {found} to {expected}")]
    SchemaMismatch {
        column: String,
        expected: DataType,
        found: DataType,
    },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Append-only table seeded from a baseline dataset.
///
/// The baseline's columns, recorded at construction, are the schema for the
/// lifetime of the accumulator. Incoming batches are cut down to that schema;
/// schema columns a batch does not carry are filled with nulls. Numeric
/// columns may widen (integer to float) but are never narrowed.
#[derive(Debug, Clone)]
pub struct Accumulator {
    columns: Vec<String>,
    baseline: DataFrame,
    total: DataFrame,
}

impl Accumulator {
    pub fn new(baseline: DataFrame) -> Self {
        Self {
            columns: column_names(&baseline),
            total: baseline.clone(),
            baseline,
        }
    }

    /// Append a batch after every row already held.
    ///
    /// Returns the number of rows appended. A batch that cannot be aligned to
    /// the schema is logged and dropped; the table is left as it was.
    pub fn accumulate(&mut self, new_data: &DataFrame) -> usize {
        if new_data.height() == 0 {
            return 0;
        }

        match self.append(new_data) {
            Ok(rows) => {
                debug!(rows, total = self.total.height(), "accumulated batch");
                rows
            }
            Err(e) => {
                warn!(error = %e, rows = new_data.height(), "dropped batch during accumulate");
                0
            }
        }
    }

    fn append(&mut self, new_data: &DataFrame) -> Result<usize, AccumulateError> {
        let aligned = self.align(new_data)?;
        let mut next = self.total.clone();

        // widen held columns a batch promoted, e.g. i64 readings meeting f64 ones
        for col in aligned.get_columns() {
            let held = next.column(col.name().as_str())?;
            if held.dtype() != col.dtype() {
                let widened = held.strict_cast(col.dtype())?;
                next.with_column(widened)?;
            }
        }

        next.vstack_mut(&aligned)?;
        if next
            .get_columns()
            .first()
            .is_some_and(|c| c.n_chunks() > MAX_CHUNKS)
        {
            next.as_single_chunk_par();
        }
        self.total = next;
        Ok(aligned.height())
    }

    /// Project a batch onto the schema, in schema order.
    ///
    /// Numeric columns take the supertype of the held and incoming dtypes so
    /// no reading is truncated. Other columns are cast to the held dtype.
    fn align(&self, new_data: &DataFrame) -> Result<DataFrame, AccumulateError> {
        if !self
            .columns
            .iter()
            .any(|c| new_data.column(c.as_str()).is_ok())
        {
            return Err(AccumulateError::NoSharedColumns);
        }

        let height = new_data.height();
        let columns = self
            .columns
            .iter()
            .map(|name| -> Result<Column, AccumulateError> {
                let expected = self.total.column(name.as_str())?.dtype().clone();
                let Ok(col) = new_data.column(name.as_str()) else {
                    return Ok(Column::full_null(name.as_str().into(), height, &expected));
                };

                let mismatch = || AccumulateError::SchemaMismatch {
                    column: name.clone(),
                    expected: expected.clone(),
                    found: col.dtype().clone(),
                };
                let target = if is_numeric(&expected) && is_numeric(col.dtype()) {
                    try_get_supertype(&expected, col.dtype()).map_err(|_| mismatch())?
                } else {
                    expected.clone()
                };
                col.strict_cast(&target).map_err(|_| mismatch())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DataFrame::new(columns)?)
    }

    /// Snapshot of the accumulated table.
    pub fn get_data(&self) -> DataFrame {
        self.total.clone()
    }

    /// Drop every accumulated batch and go back to the baseline rows.
    pub fn reset(&mut self) {
        self.total = self.baseline.clone();
    }

    /// Column schema recorded at construction.
    pub fn schema(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.total.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> DataFrame {
        df!("x" => [1i64, 2, 3], "y" => [0.1, 0.2, 0.3]).unwrap()
    }

    fn x_values(df: &DataFrame) -> Vec<Option<i64>> {
        df.column("x").unwrap().i64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_extra_columns_dropped() {
        let mut acc = Accumulator::new(baseline());
        let batch = df!(
            "x" => [4i64, 5],
            "y" => [0.4, 0.5],
            "z" => ["a", "b"]
        )
        .unwrap();

        assert_eq!(acc.accumulate(&batch), 2);
        let data = acc.get_data();
        assert_eq!(data.height(), 5);
        assert_eq!(column_names(&data), vec!["x", "y"]);
        assert_eq!(
            x_values(&data),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5)]
        );
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut acc = Accumulator::new(baseline());
        let empty = df!("x" => Vec::<i64>::new(), "y" => Vec::<f64>::new()).unwrap();
        assert_eq!(acc.accumulate(&empty), 0);
        assert_eq!(acc.accumulate(&DataFrame::empty()), 0);
        assert!(acc.get_data().equals(&baseline()));
    }

    #[test]
    fn test_appends_in_order() {
        let mut acc = Accumulator::new(baseline());
        let a = df!("y" => [0.4], "x" => [4i64]).unwrap();
        let b = df!("x" => [5i64, 6], "y" => [0.5, 0.6]).unwrap();
        acc.accumulate(&a);
        acc.accumulate(&b);

        let expected = df!(
            "x" => [1i64, 2, 3, 4, 5, 6],
            "y" => [0.1, 0.2, 0.3, 0.4, 0.5, 0.6]
        )
        .unwrap();
        assert!(acc.get_data().equals(&expected));
    }

    #[test]
    fn test_missing_schema_column_is_null() {
        let mut acc = Accumulator::new(baseline());
        let batch = df!("x" => [7i64]).unwrap();
        assert_eq!(acc.accumulate(&batch), 1);

        let data = acc.get_data();
        assert_eq!(data.height(), 4);
        assert_eq!(data.column("y").unwrap().null_count(), 1);
    }

    #[test]
    fn test_numeric_batch_cast_to_schema() {
        let mut acc = Accumulator::new(baseline());
        let batch = df!("x" => [8i32], "y" => [1i64]).unwrap();
        assert_eq!(acc.accumulate(&batch), 1);
        let data = acc.get_data();
        assert_eq!(data.column("y").unwrap().dtype(), &DataType::Float64);
        assert_eq!(x_values(&data).last(), Some(&Some(8)));
    }

    #[test]
    fn test_float_readings_widen_integer_column() {
        let mut acc = Accumulator::new(df!("molten_temp" => [731i64, 729, 735]).unwrap());
        let batch = df!("molten_temp" => [730.7f64, 731.9]).unwrap();
        assert_eq!(acc.accumulate(&batch), 2);

        let data = acc.get_data();
        let temps = data.column("molten_temp").unwrap();
        assert_eq!(temps.dtype(), &DataType::Float64);
        let values: Vec<f64> = temps.f64().unwrap().into_no_null_iter().collect();
        assert_eq!(values, vec![731.0, 729.0, 735.0, 730.7, 731.9]);

        acc.accumulate(&df!("molten_temp" => [728i64]).unwrap());
        assert_eq!(acc.get_data().column("molten_temp").unwrap().dtype(), &DataType::Float64);
        assert_eq!(acc.row_count(), 6);
    }

    #[test]
    fn test_many_small_batches_stay_compact() {
        let mut acc = Accumulator::new(baseline());
        for i in 0..200i64 {
            acc.accumulate(&df!("x" => [i], "y" => [i as f64]).unwrap());
        }
        let data = acc.get_data();
        assert_eq!(data.height(), 203);
        assert!(data.get_columns().iter().all(|c| c.n_chunks() <= MAX_CHUNKS + 1));
        assert_eq!(x_values(&data)[202], Some(199));
    }

    #[test]
    fn test_failed_batch_leaves_state() {
        let mut acc = Accumulator::new(baseline());
        let unrelated = df!("z" => ["a"]).unwrap();
        assert_eq!(acc.accumulate(&unrelated), 0);

        let bad_type = df!("x" => ["not a number"], "y" => [0.9]).unwrap();
        assert_eq!(acc.accumulate(&bad_type), 0);

        assert!(acc.get_data().equals(&baseline()));
        assert!(matches!(
            acc.align(&unrelated),
            Err(AccumulateError::NoSharedColumns)
        ));
        assert!(matches!(
            acc.align(&bad_type),
            Err(AccumulateError::SchemaMismatch { column, .. }) if column == "x"
        ));
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut acc = Accumulator::new(baseline());
        acc.accumulate(&df!("x" => [4i64], "y" => [0.4]).unwrap());
        assert_eq!(acc.row_count(), 4);

        acc.reset();
        assert!(acc.get_data().equals(&baseline()));
        assert_eq!(acc.schema(), &["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut acc = Accumulator::new(baseline());
        let mut snapshot = acc.get_data();
        snapshot
            .with_column(Column::new("x".into(), [0i64, 0, 0]))
            .unwrap();
        assert!(acc.get_data().equals(&baseline()));

        acc.accumulate(&df!("x" => [4i64], "y" => [0.4]).unwrap());
        assert_eq!(snapshot.height(), 3);
    }
}
