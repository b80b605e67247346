//! Algorithm implementations for the risk pipeline
//!
//! This module contains the stages that turn filing records into risk tiers:
//! optional cleaning, feature aggregation, scoring, tier classification and
//! the run statistics computed from their output.

pub mod cleaning;
pub mod features;
pub mod scoring;
pub mod statistics;
pub mod tiers;

// Re-export commonly used items
pub use cleaning::{CleaningConfig, CleaningStats, clean_records};
pub use features::{FeatureAggregator, RecentWindow, TaxpayerAccumulator};
pub use scoring::{RiskWeights, risk_score};
pub use statistics::{RunStatistics, RunSummary};
pub use tiers::{TierEdges, classify};
