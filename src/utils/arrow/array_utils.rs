//! Utilities for working with Arrow arrays.
//!
//! This module provides utility functions for safely extracting columns
//! from record batches, adapting their data type when the input file stored
//! them differently (integer identifiers, 0/1 indicators, textual booleans).

use arrow::array::{Array, ArrayRef};
use arrow::compute::kernels::cast::{CastOptions, can_cast_types, cast_with_options};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::{debug, warn};

use crate::error::{Error, Result};

/// Get a column from a record batch with automatic type adaptation
///
/// If the column has a different type than expected, it is converted with
/// Arrow's cast kernel. Casting is strict: a value that cannot be represented
/// in the target type is an error rather than a silent null.
///
/// # Arguments
///
/// * `batch` - The record batch containing the column
/// * `column_name` - The name of the column to extract
/// * `expected_type` - The expected data type for the column
/// * `required` - Whether the column is required (error if missing) or optional (None if missing)
///
/// # Returns
///
/// * `Ok(Some(ArrayRef))` - The column array (converted if necessary) if found
/// * `Ok(None)` - If the column is not found and `required` is false
/// * `Err` - If the column is not found and `required` is true, or if type conversion fails
pub fn get_column(
    batch: &RecordBatch,
    column_name: &str,
    expected_type: &DataType,
    required: bool,
) -> Result<Option<ArrayRef>> {
    let Ok(idx) = batch.schema().index_of(column_name) else {
        if required {
            return Err(Error::ColumnNotFound {
                column: column_name.to_string(),
            }
            .into());
        }
        warn!("Column '{column_name}' not found in record batch");
        return Ok(None);
    };

    let column = batch.column(idx);
    let actual_type = column.data_type();

    if actual_type == expected_type {
        return Ok(Some(column.clone()));
    }

    if !can_cast_types(actual_type, expected_type) {
        return Err(Error::InvalidDataType {
            column: column_name.to_string(),
            expected: format!("{expected_type:?}"),
        }
        .into());
    }

    debug!("Converting column '{column_name}' from {actual_type:?} to {expected_type:?}");

    let options = CastOptions {
        safe: false,
        ..CastOptions::default()
    };
    let converted = cast_with_options(column, expected_type, &options).map_err(|err| {
        warn!("Failed to convert column '{column_name}' to {expected_type:?}: {err}");
        Error::InvalidDataType {
            column: column_name.to_string(),
            expected: format!("{expected_type:?}"),
        }
    })?;

    Ok(Some(converted))
}

/// Downcast a column to a specific array type with clear error messages
///
/// # Type Parameters
///
/// * `A` - The target array type to downcast to
///
/// # Arguments
///
/// * `array` - The array reference to downcast
/// * `column_name` - The name of the column (for error messages)
/// * `expected_type_name` - A human-readable name of the expected type (for error messages)
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected_type_name: &str,
) -> Result<&'a A> {
    let result = array
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| Error::InvalidDataType {
            column: column_name.to_string(),
            expected: expected_type_name.to_string(),
        });

    result.map_err(std::convert::Into::into)
}

/// Get the column index by name from a record batch
///
/// # Errors
/// Returns an error if the column does not exist
pub fn get_column_index(batch: &RecordBatch, column_name: &str) -> Result<usize> {
    batch.schema().index_of(column_name).map_err(|_| {
        Error::ColumnNotFound {
            column: column_name.to_string(),
        }
        .into()
    })
}
