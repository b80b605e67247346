//! Column extraction utilities for Arrow record batches
//!
//! Each extractor adapts a whole column to the requested type and returns its
//! values as a vector with one entry per row, `None` marking nulls.
//!
//! When the column is absent and not `required`, a vector of `None` with the
//! batch's row count is returned so callers can index it uniformly.

use crate::error::Result;
use crate::utils::arrow::array_utils::{downcast_array, get_column};
use arrow::array::{Array, BooleanArray, Float64Array, Int32Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

/// Extract a string column from a record batch
///
/// Empty strings are treated as missing values.
///
/// # Arguments
///
/// * `batch` - The record batch to extract from
/// * `column_name` - The name of the column
/// * `required` - Whether the column is required
pub fn extract_string(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
) -> Result<Vec<Option<String>>> {
    let Some(array) = get_column(batch, column_name, &DataType::Utf8, required)? else {
        return Ok(vec![None; batch.num_rows()]);
    };
    let string_array = downcast_array::<StringArray>(&array, column_name, "String")?;

    Ok(string_array
        .iter()
        .map(|value| value.filter(|v| !v.is_empty()).map(str::to_string))
        .collect())
}

/// Extract an int32 column from a record batch
pub fn extract_int32(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
) -> Result<Vec<Option<i32>>> {
    let Some(array) = get_column(batch, column_name, &DataType::Int32, required)? else {
        return Ok(vec![None; batch.num_rows()]);
    };
    let int_array = downcast_array::<Int32Array>(&array, column_name, "Int32")?;

    Ok(int_array.iter().collect())
}

/// Extract a boolean column from a record batch
///
/// Numeric indicators (0/1) and textual booleans (`true`, `False`, `yes`, ...)
/// are adapted by the cast kernel.
pub fn extract_boolean(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
) -> Result<Vec<Option<bool>>> {
    let Some(array) = get_column(batch, column_name, &DataType::Boolean, required)? else {
        return Ok(vec![None; batch.num_rows()]);
    };
    let bool_array = downcast_array::<BooleanArray>(&array, column_name, "Boolean")?;

    Ok(bool_array.iter().collect())
}

/// Extract a float64 column from a record batch
///
/// NaN values are reported as missing, like nulls.
pub fn extract_float64(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
) -> Result<Vec<Option<f64>>> {
    let Some(array) = get_column(batch, column_name, &DataType::Float64, required)? else {
        return Ok(vec![None; batch.num_rows()]);
    };
    let float_array = downcast_array::<Float64Array>(&array, column_name, "Float64")?;

    Ok(float_array
        .iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    #[test]
    fn test_extract_boolean_from_text_and_integers() {
        let schema = Schema::new(vec![
            Field::new("text", DataType::Utf8, true),
            Field::new("flag", DataType::Int64, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec![Some("True"), Some("false"), None])),
                Arc::new(Int64Array::from(vec![Some(1), Some(0), None])),
            ],
        )
        .unwrap();

        assert_eq!(
            extract_boolean(&batch, "text", true).unwrap(),
            vec![Some(true), Some(false), None]
        );
        assert_eq!(
            extract_boolean(&batch, "flag", true).unwrap(),
            vec![Some(true), Some(false), None]
        );
    }

    #[test]
    fn test_extract_optional_missing_column() {
        let schema = Schema::new(vec![Field::new("a", DataType::Float64, true)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Float64Array::from(vec![Some(f64::NAN), Some(2.5)]))],
        )
        .unwrap();

        assert_eq!(extract_float64(&batch, "a", true).unwrap(), vec![None, Some(2.5)]);
        assert_eq!(extract_string(&batch, "b", false).unwrap(), vec![None, None]);
    }
}
