//! Stream module - simulated real-time replay and accumulation

mod accumulator;
mod replayer;
mod session;

pub use accumulator::{AccumulateError, Accumulator};
pub use replayer::{Batches, Replayer, StreamInfo};
pub use session::StreamSession;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}
