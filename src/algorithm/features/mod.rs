//! Feature aggregation
//!
//! Filing records are grouped by taxpayer and reduced to the five behavioral
//! features in a single scan. Each taxpayer's running aggregate lives in a
//! [`TaxpayerAccumulator`]; the recent window is fixed once for the whole
//! table before the scan.

mod accumulator;

pub use accumulator::TaxpayerAccumulator;

use log::debug;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::config::RiskConfig;
use crate::models::{FilingRecord, TaxpayerFeatures};

/// The most recent tax years of the table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentWindow {
    /// First year inside the window
    pub cutoff_year: i32,
    /// Payment delay (days) above which a recent record is an issue
    pub late_payment_threshold_days: f64,
}

impl RecentWindow {
    /// Window covering the last `window_years` years before the table's maximum year
    ///
    /// Returns `None` for an empty table.
    #[must_use]
    pub fn from_records(
        records: &[FilingRecord],
        window_years: i32,
        late_payment_threshold_days: f64,
    ) -> Option<Self> {
        let max_year = records.iter().map(|record| record.year).max()?;
        Some(Self {
            cutoff_year: max_year - (window_years.max(1) - 1),
            late_payment_threshold_days,
        })
    }

    #[must_use]
    pub fn contains(&self, year: i32) -> bool {
        year >= self.cutoff_year
    }
}

/// Groups filing records by taxpayer and computes their features
#[derive(Debug, Clone)]
pub struct FeatureAggregator {
    window_years: i32,
    late_payment_threshold_days: f64,
    fill_missing_recent_window: bool,
    parallel: bool,
}

impl Default for FeatureAggregator {
    fn default() -> Self {
        Self::from_config(&RiskConfig::default())
    }
}

impl FeatureAggregator {
    #[must_use]
    pub fn from_config(config: &RiskConfig) -> Self {
        Self {
            window_years: config.recent_window_years,
            late_payment_threshold_days: config.late_payment_threshold_days,
            fill_missing_recent_window: config.fill_missing_recent_window,
            parallel: config.parallel,
        }
    }

    /// Compute one feature row per taxpayer, ordered by `TaxpayerID`
    #[must_use]
    pub fn aggregate(&self, records: &[FilingRecord]) -> Vec<TaxpayerFeatures> {
        let Some(window) = RecentWindow::from_records(
            records,
            self.window_years,
            self.late_payment_threshold_days,
        ) else {
            return Vec::new();
        };
        debug!("Recent window starts at year {}", window.cutoff_year);

        let mut features = if self.parallel {
            self.aggregate_parallel(records, &window)
        } else {
            self.aggregate_sequential(records, &window)
        };
        features.sort_unstable_by(|a, b| a.taxpayer_id.cmp(&b.taxpayer_id));
        features
    }

    fn aggregate_sequential(
        &self,
        records: &[FilingRecord],
        window: &RecentWindow,
    ) -> Vec<TaxpayerFeatures> {
        let mut accumulators: FxHashMap<&str, TaxpayerAccumulator> = FxHashMap::default();
        for record in records {
            accumulators
                .entry(record.taxpayer_id.as_str())
                .or_default()
                .add(record, window);
        }

        accumulators
            .into_iter()
            .map(|(id, acc)| acc.finalize(id.to_string(), self.fill_missing_recent_window))
            .collect()
    }

    /// Group first, then reduce each taxpayer on the rayon pool
    ///
    /// Records of one taxpayer are still folded in table order, so the sums
    /// and therefore the features match the sequential scan exactly.
    fn aggregate_parallel(
        &self,
        records: &[FilingRecord],
        window: &RecentWindow,
    ) -> Vec<TaxpayerFeatures> {
        let mut groups: FxHashMap<&str, Vec<&FilingRecord>> = FxHashMap::default();
        for record in records {
            groups
                .entry(record.taxpayer_id.as_str())
                .or_default()
                .push(record);
        }

        groups
            .into_par_iter()
            .map(|(id, group)| {
                let mut acc = TaxpayerAccumulator::default();
                for record in group {
                    acc.add(record, window);
                }
                acc.finalize(id.to_string(), self.fill_missing_recent_window)
            })
            .collect()
    }
}
