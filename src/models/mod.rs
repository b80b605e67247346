//! Data models for filing records, taxpayer profiles and derived results
//!
//! Input rows are read from Arrow record batches by the schema-aware
//! constructors in [`filing`] and [`profile`]. Everything else in this module
//! is derived and recomputed on every run.

pub mod features;
pub mod filing;
pub mod profile;
pub mod scored;

pub use features::{Feature, TaxpayerFeatures};
pub use filing::FilingRecord;
pub use profile::ProfileTable;
pub use scored::{ExcludedTaxpayer, RiskLevel, ScoredTaxpayer};
