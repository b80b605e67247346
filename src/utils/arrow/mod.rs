//! Arrow data handling utilities
//!
//! This module contains utilities for looking up columns in record batches,
//! adapting them to the types the pipeline expects, and extracting their
//! values into plain Rust vectors.

pub mod array_utils;
pub mod extractors;

// Re-export commonly used functions for convenience
pub use array_utils::{downcast_array, get_column, get_column_index};
pub use extractors::{extract_boolean, extract_float64, extract_int32, extract_string};
