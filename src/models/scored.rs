//! Scoring results

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::features::{Feature, TaxpayerFeatures};

/// Ordered risk tier, assigned relative to the scored cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// All tiers in increasing order
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A taxpayer with a defined risk score and its tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTaxpayer {
    pub features: TaxpayerFeatures,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
}

impl ScoredTaxpayer {
    #[must_use]
    pub fn taxpayer_id(&self) -> &str {
        &self.features.taxpayer_id
    }
}

/// A taxpayer left out of classification because its score is undefined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedTaxpayer {
    pub taxpayer_id: String,
    /// Features that made the score undefined; empty when the score
    /// overflowed to a non-finite value
    pub undefined_features: Vec<Feature>,
}

impl ExcludedTaxpayer {
    /// Human-readable reason for the exclusion
    #[must_use]
    pub fn reason(&self) -> String {
        if self.undefined_features.is_empty() {
            "score is not finite".to_string()
        } else {
            let names: Vec<&str> = self.undefined_features.iter().map(|f| f.name()).collect();
            format!("undefined {}", names.join(", "))
        }
    }
}
