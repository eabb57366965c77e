//! Sequential Replayer
//! Replays a fixed table in row order, one batch per call, to simulate live arrival.

use super::StreamError;
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Replay progress reported to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreamInfo {
    pub total_rows: usize,
    pub current_index: usize,
    /// Percentage of rows replayed, 0.0 to 100.0. Zero for an empty table.
    pub progress: f64,
}

/// Walks a table from the first row to the last, batch by batch.
///
/// The cursor only moves forward; [`Replayer::reset`] is the only way back.
/// After the last row the replayer stays queryable and keeps returning
/// `Ok(None)` from [`Replayer::next_batch`].
#[derive(Debug, Clone)]
pub struct Replayer {
    full_data: DataFrame,
    current_index: usize,
}

impl Replayer {
    pub fn new(full_data: DataFrame) -> Self {
        Self {
            full_data,
            current_index: 0,
        }
    }

    /// Take the next `batch_size` rows and advance the cursor past them.
    ///
    /// Returns `Ok(None)` once every row has been replayed. The final batch
    /// holds whatever is left, which may be fewer than `batch_size` rows.
    pub fn next_batch(&mut self, batch_size: usize) -> Result<Option<DataFrame>, StreamError> {
        if batch_size == 0 {
            return Err(StreamError::InvalidBatchSize(batch_size));
        }

        let total = self.total_rows();
        if self.current_index >= total {
            return Ok(None);
        }

        let end = self.current_index.saturating_add(batch_size).min(total);
        let batch = self
            .full_data
            .slice(self.current_index as i64, end - self.current_index);
        debug!(from = self.current_index, to = end, total, "replayed batch");
        self.current_index = end;

        Ok(Some(batch))
    }

    /// Iterate over the remaining rows in batches of `batch_size`.
    pub fn batches(&mut self, batch_size: usize) -> Result<Batches<'_>, StreamError> {
        if batch_size == 0 {
            return Err(StreamError::InvalidBatchSize(batch_size));
        }
        Ok(Batches {
            replayer: self,
            batch_size,
        })
    }

    /// All rows replayed so far. Zero rows before the first batch.
    pub fn current_data(&self) -> DataFrame {
        self.full_data.slice(0, self.current_index)
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
    }

    pub fn stream_info(&self) -> StreamInfo {
        let total_rows = self.total_rows();
        let progress = if total_rows > 0 {
            (self.current_index as f64 / total_rows as f64) * 100.0
        } else {
            0.0
        };

        StreamInfo {
            total_rows,
            current_index: self.current_index,
            progress,
        }
    }

    pub fn total_rows(&self) -> usize {
        self.full_data.height()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.total_rows()
    }
}

/// Iterator returned by [`Replayer::batches`].
pub struct Batches<'a> {
    replayer: &'a mut Replayer,
    batch_size: usize,
}

impl Iterator for Batches<'_> {
    type Item = DataFrame;

    fn next(&mut self) -> Option<DataFrame> {
        // batch_size was validated when the iterator was built
        self.replayer.next_batch(self.batch_size).ok().flatten()
    }
}
