//! Compliance risk scoring for taxpayers.
//!
//! Reads a table of yearly filing records and a table of taxpayer profiles,
//! derives five behavioral features per taxpayer, combines them into a
//! weighted risk score and ranks the scored cohort into Low, Medium and High
//! tiers by score tertiles.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{RiskConfig, UndefinedPolicy};
pub use error::{Error, Result};
pub use pipeline::{JoinStats, RiskPipeline, RiskRun};

// Models
pub use models::{
    ExcludedTaxpayer, Feature, FilingRecord, ProfileTable, RiskLevel, ScoredTaxpayer,
    TaxpayerFeatures,
};

// Stages
pub use algorithm::{
    CleaningConfig, FeatureAggregator, RunStatistics, RunSummary, TierEdges, classify,
    clean_records, risk_score,
};

// Input and output
pub use loader::{load_filings, load_profiles, read_table};
pub use report::{build_report_batch, join_profile_columns, print_report, write_report};

// Arrow types
pub use arrow::record_batch::RecordBatch;
