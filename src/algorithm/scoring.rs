//! Weighted risk score
//!
//! ```text
//! RiskScore = 3·MissedFilingsRate + 2·(AvgPaymentDelay / 180) + 3·UnderpaymentRatio
//!           + 2·RecentIssues − 2·VoluntaryDisclosureRate
//! ```
//!
//! The weights are fixed heuristics. The score is not clamped and can be
//! negative or exceed the usual range when inputs are extreme.

use crate::models::TaxpayerFeatures;

/// Weights of the risk score terms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskWeights {
    pub missed_filings: f64,
    pub payment_delay: f64,
    pub underpayment: f64,
    pub recent_issues: f64,
    /// Subtracted: disclosure lowers the score
    pub voluntary_disclosure: f64,
    /// Delay (days) that maps to 1.0 before weighting
    pub delay_normalization_days: f64,
}

impl RiskWeights {
    /// The heuristic weights used by every run
    pub const HEURISTIC: Self = Self {
        missed_filings: 3.0,
        payment_delay: 2.0,
        underpayment: 3.0,
        recent_issues: 2.0,
        voluntary_disclosure: 2.0,
        delay_normalization_days: 180.0,
    };

    /// Score a taxpayer, or `None` when a feature is undefined or the result
    /// is not finite
    #[must_use]
    pub fn score(&self, features: &TaxpayerFeatures) -> Option<f64> {
        let avg_payment_delay = features.avg_payment_delay?;
        let underpayment_ratio = features.underpayment_ratio?;
        let recent_issues = features.recent_issues_indicator()?;
        let voluntary_disclosure_rate = features.voluntary_disclosure_rate?;

        let score = self.missed_filings * features.missed_filings_rate
            + self.payment_delay * (avg_payment_delay / self.delay_normalization_days)
            + self.underpayment * underpayment_ratio
            + self.recent_issues * recent_issues
            - self.voluntary_disclosure * voluntary_disclosure_rate;

        score.is_finite().then_some(score)
    }
}

/// Score a taxpayer with the heuristic weights
#[must_use]
pub fn risk_score(features: &TaxpayerFeatures) -> Option<f64> {
    RiskWeights::HEURISTIC.score(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> TaxpayerFeatures {
        TaxpayerFeatures {
            taxpayer_id: "T1".to_string(),
            missed_filings_rate: 0.5,
            avg_payment_delay: Some(90.0),
            voluntary_disclosure_rate: Some(0.5),
            underpayment_ratio: Some(-0.1),
            recent_issues: Some(false),
        }
    }

    #[test]
    fn test_each_term() {
        // 1.5 + 1.0 - 0.3 + 0 - 1.0
        let score = risk_score(&features()).unwrap();
        assert!((score - 1.2).abs() < 1e-12);

        let mut with_issues = features();
        with_issues.recent_issues = Some(true);
        assert!((risk_score(&with_issues).unwrap() - 3.2).abs() < 1e-12);
    }

    #[test]
    fn test_score_can_be_negative() {
        let features = TaxpayerFeatures {
            missed_filings_rate: 0.0,
            avg_payment_delay: Some(0.0),
            voluntary_disclosure_rate: Some(1.0),
            underpayment_ratio: Some(0.0),
            recent_issues: Some(false),
            ..features()
        };
        assert_eq!(risk_score(&features), Some(-2.0));
    }

    #[test]
    fn test_undefined_feature_gives_no_score() {
        let mut features = features();
        features.underpayment_ratio = None;
        assert_eq!(risk_score(&features), None);
    }

    #[test]
    fn test_non_finite_score_is_undefined() {
        let mut features = features();
        features.avg_payment_delay = Some(f64::INFINITY);
        assert_eq!(risk_score(&features), None);
    }
}
