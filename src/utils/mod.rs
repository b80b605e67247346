//! Utility functions shared by the loader, the pipeline stages and the reporter

pub mod arrow;
pub mod logging;

/// Default batch size for reading CSV and Parquet tables
pub const DEFAULT_BATCH_SIZE: usize = 16384;
