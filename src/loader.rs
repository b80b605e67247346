//! Table loading utilities
//!
//! Input tables are CSV (with a header row, types inferred from the whole
//! file) or Parquet files. A directory is read as one table made of every
//! supported file it contains, loaded in parallel.

use anyhow::Context;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{self, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::models::{FilingRecord, ProfileTable};
use crate::utils::DEFAULT_BATCH_SIZE;
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Supported table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    /// Detect the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::Csv),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }
}

/// Read the filing records table
pub fn load_filings(path: &Path) -> Result<Vec<FilingRecord>> {
    let batches = read_table(path)?;
    FilingRecord::from_batches(&batches)
        .with_context(|| format!("Invalid filing records table: {}", path.display()))
}

/// Read the taxpayer profile table
pub fn load_profiles(path: &Path) -> Result<ProfileTable> {
    let batches = read_table(path)?;
    ProfileTable::from_batches(&batches)
        .with_context(|| format!("Invalid taxpayer profile table: {}", path.display()))
}

/// Read a table file, or every table file of a directory, into record batches
pub fn read_table(path: &Path) -> Result<Vec<RecordBatch>> {
    if path.is_dir() {
        return read_table_dir(path);
    }

    let start = Instant::now();
    log_operation_start("Reading table", path);
    let batches = match TableFormat::from_path(path) {
        Some(TableFormat::Csv) => read_csv(path)?,
        Some(TableFormat::Parquet) => read_parquet(path)?,
        None => {
            return Err(Error::UnsupportedFormat {
                path: path.display().to_string(),
            }
            .into());
        }
    };
    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    log_operation_complete("read", path, rows, Some(start.elapsed()));

    Ok(batches)
}

/// Read a CSV file with a header row into record batches
pub fn read_csv(path: &Path) -> Result<Vec<RecordBatch>> {
    let mut file = safe_open_file(path, "reading CSV table")?;

    let format = Format::default().with_header(true);
    let (schema, _) = format
        .infer_schema(&mut file, None)
        .with_context(|| format!("Failed to infer CSV schema of {}", path.display()))?;
    file.rewind()
        .with_context(|| format!("Failed to rewind {}", path.display()))?;

    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_format(format)
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build(file)
        .with_context(|| format!("Failed to build CSV reader for {}", path.display()))?;

    reader
        .map(|batch| {
            batch.with_context(|| format!("Failed to read record batch from {}", path.display()))
        })
        .collect()
}

/// Read a Parquet file into record batches
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>> {
    let file = safe_open_file(path, "reading parquet file")?;

    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("Failed to read parquet file: {}", path.display()))?
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build()
        .with_context(|| format!("Failed to build parquet reader for {}", path.display()))?;

    reader
        .map(|batch| {
            batch.with_context(|| format!("Failed to read record batch from {}", path.display()))
        })
        .collect()
}

/// Load all table files from a directory in parallel
///
/// Files are read in name order so the table's row order is stable.
fn read_table_dir(dir: &Path) -> Result<Vec<RecordBatch>> {
    let mut files = Vec::<PathBuf>::new();
    for entry_result in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry_result
            .with_context(|| format!("Failed to read directory entry in {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() && TableFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        log_warning("No CSV or Parquet files found in directory", Some(dir));
        return Ok(Vec::new());
    }

    let start = Instant::now();
    log_operation_start(&format!("Reading {} table files from", files.len()), dir);
    let per_file: Vec<Vec<RecordBatch>> = files
        .par_iter()
        .map(|path| read_table(path))
        .collect::<Result<_>>()?;
    let batches: Vec<RecordBatch> = per_file.into_iter().flatten().collect();
    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    log_operation_complete("read", dir, rows, Some(start.elapsed()));

    Ok(batches)
}

/// Open a file, describing why it was needed when it cannot be opened
fn safe_open_file(path: &Path, purpose: &str) -> Result<File> {
    if !path.is_file() {
        return Err(anyhow::anyhow!("File not found: {}", path.display()))
            .with_context(|| format!("Needed for: {purpose}"));
    }

    File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => "Permission denied - check file permissions".to_string(),
            _ => format!("Failed to open file for: {purpose}"),
        };
        anyhow::Error::new(e).context(format!("{context}: {}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(TableFormat::from_path(Path::new("a/b.CSV")), Some(TableFormat::Csv));
        assert_eq!(
            TableFormat::from_path(Path::new("b.parquet")),
            Some(TableFormat::Parquet)
        );
        assert_eq!(TableFormat::from_path(Path::new("b.xlsx")), None);
        assert_eq!(TableFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = read_table(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("File not found"));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.xlsx");
        fs::write(&path, "x").unwrap();

        let err = read_table(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnsupportedFormat { .. })
        ));
    }
}
