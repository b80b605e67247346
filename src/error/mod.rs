//! Error handling for the risk pipeline.
//!
//! Domain failures are described by [`Error`]. Functions return the crate-wide
//! [`Result`] alias, which wraps everything (including Arrow, Parquet and I/O
//! failures) in an `anyhow::Error`. Callers that need to branch on a specific
//! failure can recover it with `err.downcast_ref::<Error>()`.

use crate::models::RiskLevel;

/// Specialized error type for loading, aggregating, scoring and tiering
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required column is missing from an input table
    #[error("Column '{column}' not found")]
    ColumnNotFound { column: String },

    /// A column exists but cannot be adapted to the expected type
    #[error("Column '{column}' cannot be read as {expected}")]
    InvalidDataType { column: String, expected: String },

    /// The file extension does not name a supported table format
    #[error("Unsupported table format: {path}")]
    UnsupportedFormat { path: String },

    /// An input table contains no rows
    #[error("Input table '{table}' contains no rows")]
    EmptyInput { table: String },

    /// A row lacks a value that every record must carry
    #[error("Missing {column} in table '{table}' at row {row}")]
    MissingValue {
        table: String,
        column: String,
        row: usize,
    },

    /// A taxpayer cannot be scored because some features are undefined
    #[error("Risk score for taxpayer {taxpayer_id} is undefined (undefined features: {features})")]
    UndefinedScore {
        taxpayer_id: String,
        features: String,
    },

    /// Not enough scores to form every tier
    #[error("Cannot form {tiers} risk tiers from {count} scores")]
    TooFewScores { count: usize, tiers: usize },

    /// Quantile edges collapse because of tied scores
    #[error("Risk score bin edges are not unique: {edges:?}")]
    DuplicateBinEdges { edges: Vec<f64> },

    /// A tier would receive no taxpayers
    #[error("Risk tier {level} would be empty")]
    EmptyTier { level: RiskLevel },

    /// The classifier was handed a NaN or infinite score
    #[error("Risk score at position {index} is not finite")]
    NonFiniteScore { index: usize },
}

/// Result type for pipeline operations
pub type Result<T> = anyhow::Result<T>;
