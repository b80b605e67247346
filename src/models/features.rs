//! Behavioral features derived per taxpayer

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five behavioral features that feed the risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    MissedFilingsRate,
    AvgPaymentDelay,
    VoluntaryDisclosureRate,
    UnderpaymentRatio,
    RecentIssues,
}

impl Feature {
    /// Column name used for the feature in reports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MissedFilingsRate => "MissedFilingsRate",
            Self::AvgPaymentDelay => "AvgPaymentDelay",
            Self::VoluntaryDisclosureRate => "VoluntaryDisclosureRate",
            Self::UnderpaymentRatio => "UnderpaymentRatio",
            Self::RecentIssues => "RecentIssues",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Aggregated features of one taxpayer
///
/// `None` marks an undefined feature: no defined inputs, a zero estimated
/// tax on some record, or no record in the recent window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxpayerFeatures {
    pub taxpayer_id: String,
    /// Share of records without a filed return, in [0, 1]
    pub missed_filings_rate: f64,
    /// Mean payment delay in days over filed records
    pub avg_payment_delay: Option<f64>,
    /// Mean voluntary disclosure indicator over filed records
    pub voluntary_disclosure_rate: Option<f64>,
    /// Mean of `(estimated - actual) / estimated` over records
    pub underpayment_ratio: Option<f64>,
    /// Whether any recent-window record was unfiled or paid late
    pub recent_issues: Option<bool>,
}

impl TaxpayerFeatures {
    /// Features that are undefined for this taxpayer, in scoring order
    #[must_use]
    pub fn undefined_features(&self) -> Vec<Feature> {
        let mut undefined = Vec::new();
        if self.avg_payment_delay.is_none() {
            undefined.push(Feature::AvgPaymentDelay);
        }
        if self.underpayment_ratio.is_none() {
            undefined.push(Feature::UnderpaymentRatio);
        }
        if self.recent_issues.is_none() {
            undefined.push(Feature::RecentIssues);
        }
        if self.voluntary_disclosure_rate.is_none() {
            undefined.push(Feature::VoluntaryDisclosureRate);
        }
        undefined
    }

    /// Whether every feature is defined
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.avg_payment_delay.is_some()
            && self.voluntary_disclosure_rate.is_some()
            && self.underpayment_ratio.is_some()
            && self.recent_issues.is_some()
    }

    /// `RecentIssues` as the 0/1 indicator used in scores and reports
    #[must_use]
    pub fn recent_issues_indicator(&self) -> Option<f64> {
        self.recent_issues.map(|issues| if issues { 1.0 } else { 0.0 })
    }
}
