//! Cast Monitor - data loading & simulated streaming for a casting process dashboard
//!
//! Loads a baseline and a streaming dataset, replays the streaming rows batch
//! by batch and accumulates them on top of the baseline for cumulative views.

pub mod config;
pub mod data;
pub mod stats;
pub mod stream;

pub use config::{DashboardConfig, SensorLabel};
pub use data::{DataLoader, LoaderError, SourceTables};
pub use stream::{Accumulator, Replayer, StreamError, StreamInfo, StreamSession};
