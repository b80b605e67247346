//! Logging utilities
//!
//! This module provides the standard log lines emitted when loading tables
//! and running pipeline stages.

pub mod log;

// Re-export commonly used functions for convenience
pub use log::{
    log_operation_complete, log_operation_start, log_stage_complete, log_stage_start,
    log_warning,
};
