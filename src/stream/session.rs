//! Stream Session
//! One replayer and one accumulator owned together by a single dashboard session.

use super::{Accumulator, Replayer, StreamError, StreamInfo};
use crate::data::SourceTables;
use polars::prelude::*;

/// Per-session replay state.
///
/// Sessions never share a cursor or an accumulated table; a host serving
/// several dashboards builds one session for each.
#[derive(Debug, Clone)]
pub struct StreamSession {
    replayer: Replayer,
    accumulator: Accumulator,
}

impl StreamSession {
    pub fn new(tables: &SourceTables) -> Result<Self, StreamError> {
        Ok(Self {
            replayer: Replayer::new(tables.selected().clone()),
            accumulator: Accumulator::new(tables.accumulation_seed()?),
        })
    }

    /// Pull the next batch and feed it to the accumulator.
    ///
    /// Returns the batch, or `Ok(None)` once the stream is exhausted.
    pub fn step(&mut self, batch_size: usize) -> Result<Option<DataFrame>, StreamError> {
        let batch = self.replayer.next_batch(batch_size)?;
        if let Some(batch) = &batch {
            self.accumulator.accumulate(batch);
        }
        Ok(batch)
    }

    pub fn stream_info(&self) -> StreamInfo {
        self.replayer.stream_info()
    }

    pub fn current_data(&self) -> DataFrame {
        self.replayer.current_data()
    }

    pub fn accumulated(&self) -> DataFrame {
        self.accumulator.get_data()
    }

    pub fn reset(&mut self) {
        self.replayer.reset();
        self.accumulator.reset();
    }

    pub fn replayer(&self) -> &Replayer {
        &self.replayer
    }

    pub fn replayer_mut(&mut self) -> &mut Replayer {
        &mut self.replayer
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn accumulator_mut(&mut self) -> &mut Accumulator {
        &mut self.accumulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::column_names;

    fn tables() -> SourceTables {
        let baseline = df!(
            "x" => [1i64, 2, 3],
            "y" => [0.1, 0.2, 0.3],
            "static_only" => ["a", "b", "c"]
        )
        .unwrap();
        let streaming = df!(
            "x" => [4i64, 5, 6, 7, 8],
            "y" => [0.4, 0.5, 0.6, 0.7, 0.8],
            "z" => ["p", "q", "r", "s", "t"]
        )
        .unwrap();
        let selected = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        SourceTables::new(baseline, streaming, &selected).unwrap()
    }

    #[test]
    fn test_step_feeds_accumulator() {
        let mut session = StreamSession::new(&tables()).unwrap();
        assert_eq!(session.accumulated().height(), 3);
        assert_eq!(session.accumulator().schema(), &["x".to_string(), "y".to_string()]);

        let batch = session.step(2).unwrap().unwrap();
        assert_eq!(batch.height(), 2);
        assert_eq!(column_names(&batch), vec!["x", "y", "z"]);

        while session.step(2).unwrap().is_some() {}
        let accumulated = session.accumulated();
        assert_eq!(accumulated.height(), 8);
        assert_eq!(column_names(&accumulated), vec!["x", "y"]);
        assert_eq!(session.stream_info().progress, 100.0);
    }

    #[test]
    fn test_reset_both_components() {
        let tables = tables();
        let mut session = StreamSession::new(&tables).unwrap();
        session.step(4).unwrap();
        session.reset();

        assert_eq!(session.stream_info().current_index, 0);
        assert_eq!(session.current_data().height(), 0);
        assert!(session
            .accumulated()
            .equals(&tables.accumulation_seed().unwrap()));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let tables = tables();
        let mut a = StreamSession::new(&tables).unwrap();
        let b = StreamSession::new(&tables).unwrap();
        a.step(3).unwrap();
        assert_eq!(a.stream_info().current_index, 3);
        assert_eq!(b.stream_info().current_index, 0);
        assert_eq!(b.accumulated().height(), 3);
    }

    #[test]
    fn test_invalid_batch_size() {
        let mut session = StreamSession::new(&tables()).unwrap();
        assert!(matches!(session.step(0), Err(StreamError::InvalidBatchSize(0))));
        assert_eq!(session.accumulated().height(), 3);
    }
}
