//! Running aggregate of one taxpayer's filing records

use super::RecentWindow;
use crate::models::{FilingRecord, TaxpayerFeatures};

/// Counts and sums collected while scanning a taxpayer's records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxpayerAccumulator {
    records: usize,
    filed: usize,
    delay_sum: f64,
    delay_count: usize,
    disclosure_sum: f64,
    disclosure_count: usize,
    underpayment_sum: f64,
    underpayment_count: usize,
    /// Set once any record has a zero or non-finite underpayment ratio
    underpayment_undefined: bool,
    recent_records: usize,
    recent_issue: bool,
}

impl TaxpayerAccumulator {
    /// Fold one record into the aggregate
    ///
    /// Delay and disclosure only count for filed returns, whatever the record
    /// carries in those fields.
    pub fn add(&mut self, record: &FilingRecord, window: &RecentWindow) {
        self.records += 1;

        if record.return_filed {
            self.filed += 1;
            if let Some(delay) = record.payment_delay_days {
                self.delay_sum += delay;
                self.delay_count += 1;
            }
            if let Some(disclosure) = record.voluntary_disclosure {
                self.disclosure_sum += disclosure;
                self.disclosure_count += 1;
            }
        }

        if record.estimated_tax == Some(0.0) {
            self.underpayment_undefined = true;
        } else if let Some(ratio) = record.underpayment_ratio() {
            if ratio.is_finite() {
                self.underpayment_sum += ratio;
                self.underpayment_count += 1;
            } else {
                self.underpayment_undefined = true;
            }
        }

        if window.contains(record.year) {
            self.recent_records += 1;
            if record.is_issue(window.late_payment_threshold_days) {
                self.recent_issue = true;
            }
        }
    }

    /// Number of records folded so far
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Turn the aggregate into rates and means
    ///
    /// # Arguments
    /// * `taxpayer_id` - Identifier of the taxpayer
    /// * `fill_missing_recent_window` - Report `RecentIssues = false` instead of
    ///   undefined when no record fell in the recent window
    #[must_use]
    pub fn finalize(self, taxpayer_id: String, fill_missing_recent_window: bool) -> TaxpayerFeatures {
        let missed_filings_rate = if self.records == 0 {
            0.0
        } else {
            1.0 - self.filed as f64 / self.records as f64
        };

        let recent_issues = if self.recent_records > 0 {
            Some(self.recent_issue)
        } else if fill_missing_recent_window {
            Some(false)
        } else {
            None
        };

        let underpayment_ratio = if self.underpayment_undefined {
            None
        } else {
            mean(self.underpayment_sum, self.underpayment_count)
        };

        TaxpayerFeatures {
            taxpayer_id,
            missed_filings_rate,
            avg_payment_delay: mean(self.delay_sum, self.delay_count),
            voluntary_disclosure_rate: mean(self.disclosure_sum, self.disclosure_count),
            underpayment_ratio,
            recent_issues,
        }
    }
}

fn mean(sum: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: RecentWindow = RecentWindow {
        cutoff_year: 2023,
        late_payment_threshold_days: 30.0,
    };

    #[test]
    fn test_unfiled_record_fields_are_ignored() {
        let mut record = FilingRecord::not_filed("T1", 2020, 100.0, 100.0);
        record.payment_delay_days = Some(500.0);
        record.voluntary_disclosure = Some(1.0);

        let mut acc = TaxpayerAccumulator::default();
        acc.add(&record, &WINDOW);
        acc.add(&FilingRecord::filed("T1", 2021, 10.0, 0.0, 100.0, 100.0), &WINDOW);

        let features = acc.finalize("T1".to_string(), false);
        assert_eq!(features.missed_filings_rate, 0.5);
        assert_eq!(features.avg_payment_delay, Some(10.0));
        assert_eq!(features.voluntary_disclosure_rate, Some(0.0));
        assert_eq!(features.recent_issues, None);
    }

    #[test]
    fn test_zero_estimate_makes_underpayment_undefined() {
        let mut acc = TaxpayerAccumulator::default();
        acc.add(&FilingRecord::filed("T1", 2023, 0.0, 0.0, 1000.0, 900.0), &WINDOW);
        acc.add(&FilingRecord::filed("T1", 2024, 0.0, 0.0, 0.0, 0.0), &WINDOW);

        let features = acc.finalize("T1".to_string(), false);
        assert_eq!(features.underpayment_ratio, None);
        assert_eq!(features.recent_issues, Some(false));
    }

    #[test]
    fn test_fill_missing_recent_window() {
        let mut acc = TaxpayerAccumulator::default();
        acc.add(&FilingRecord::not_filed("T1", 2010, 100.0, 0.0), &WINDOW);
        assert_eq!(acc.record_count(), 1);

        let features = acc.finalize("T1".to_string(), true);
        assert_eq!(features.recent_issues, Some(false));
        assert_eq!(features.missed_filings_rate, 1.0);
        assert_eq!(features.avg_payment_delay, None);
    }
}
