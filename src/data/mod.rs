//! Data module - CSV loading and source tables

mod loader;
mod source;
pub mod table;

pub use loader::{DataLoader, LoaderError};
pub use source::SourceTables;
