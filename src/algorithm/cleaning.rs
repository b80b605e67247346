//! Cleaning of filing records before aggregation
//!
//! Two passes over the records. The first is a per-record normalization:
//! fields that are undefined for an unfiled return are dropped, and values
//! outside their domain (negative delays, disclosure indicators outside
//! [0, 1], non-finite amounts) become missing. The second clips statistical
//! outliers to `[Q1 − k·IQR, Q3 + k·IQR]`, with the delay bounds computed over
//! filed returns only.

use log::{debug, info};
use std::fmt;

use crate::algorithm::statistics::quantile;
use crate::models::FilingRecord;

/// Columns with fewer defined values than this are not clipped
const MIN_VALUES_FOR_CLIPPING: usize = 4;

/// Configuration for the cleaning stage
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningConfig {
    /// Width of the clipping fence in interquartile ranges
    pub iqr_multiplier: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
        }
    }
}

/// Counts of the values changed by the cleaning stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningStats {
    pub nulled_payment_delays: usize,
    pub nulled_disclosures: usize,
    pub nulled_tax_amounts: usize,
    pub clipped_payment_delays: usize,
    pub clipped_estimated_tax: usize,
    pub clipped_actual_tax: usize,
}

impl CleaningStats {
    #[must_use]
    pub fn nulled_total(&self) -> usize {
        self.nulled_payment_delays + self.nulled_disclosures + self.nulled_tax_amounts
    }

    #[must_use]
    pub fn clipped_total(&self) -> usize {
        self.clipped_payment_delays + self.clipped_estimated_tax + self.clipped_actual_tax
    }
}

impl fmt::Display for CleaningStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nulled {} delays, {} disclosures, {} tax amounts; clipped {} delays, {} estimated, {} actual",
            self.nulled_payment_delays,
            self.nulled_disclosures,
            self.nulled_tax_amounts,
            self.clipped_payment_delays,
            self.clipped_estimated_tax,
            self.clipped_actual_tax
        )
    }
}

/// Inclusive clipping range for one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipBounds {
    pub lower: f64,
    pub upper: f64,
}

impl ClipBounds {
    /// Tukey fences of the values, or `None` when there are too few values
    #[must_use]
    pub fn from_values(mut values: Vec<f64>, iqr_multiplier: f64) -> Option<Self> {
        if values.len() < MIN_VALUES_FOR_CLIPPING {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let q1 = quantile(&values, 0.25);
        let q3 = quantile(&values, 0.75);
        let iqr = q3 - q1;
        Some(Self {
            lower: q1 - iqr_multiplier * iqr,
            upper: q3 + iqr_multiplier * iqr,
        })
    }

    /// Clip a value in place, returning whether it changed
    fn clip(&self, value: &mut Option<f64>) -> bool {
        match value {
            Some(v) if *v < self.lower => {
                *v = self.lower;
                true
            }
            Some(v) if *v > self.upper => {
                *v = self.upper;
                true
            }
            _ => false,
        }
    }
}

/// Clean filing records, returning the cleaned records and what changed
///
/// The output has the same records in the same order. Zero estimated tax
/// amounts are left as they are, so the taxpayer's underpayment ratio stays
/// undefined.
#[must_use]
pub fn clean_records(
    records: Vec<FilingRecord>,
    config: &CleaningConfig,
) -> (Vec<FilingRecord>, CleaningStats) {
    let mut stats = CleaningStats::default();
    let mut records: Vec<FilingRecord> = records
        .into_iter()
        .map(|record| normalize_record(record, &mut stats))
        .collect();

    let delay_bounds = ClipBounds::from_values(
        records
            .iter()
            .filter(|record| record.return_filed)
            .filter_map(|record| record.payment_delay_days)
            .collect(),
        config.iqr_multiplier,
    )
    .map(|bounds| ClipBounds {
        lower: bounds.lower.max(0.0),
        upper: bounds.upper,
    });
    let estimated_bounds = ClipBounds::from_values(
        records
            .iter()
            .filter_map(|record| record.estimated_tax)
            .filter(|&tax| tax != 0.0)
            .collect(),
        config.iqr_multiplier,
    );
    let actual_bounds = ClipBounds::from_values(
        records.iter().filter_map(|record| record.actual_tax).collect(),
        config.iqr_multiplier,
    );
    debug!(
        "Clipping bounds: delay {delay_bounds:?}, estimated {estimated_bounds:?}, actual {actual_bounds:?}"
    );

    for record in &mut records {
        if let Some(bounds) = &delay_bounds {
            if record.return_filed && bounds.clip(&mut record.payment_delay_days) {
                stats.clipped_payment_delays += 1;
            }
        }
        if let Some(bounds) = &estimated_bounds {
            if record.estimated_tax != Some(0.0) && bounds.clip(&mut record.estimated_tax) {
                stats.clipped_estimated_tax += 1;
            }
        }
        if let Some(bounds) = &actual_bounds {
            if bounds.clip(&mut record.actual_tax) {
                stats.clipped_actual_tax += 1;
            }
        }
    }

    info!("Cleaned {} filing records: {stats}", records.len());
    (records, stats)
}

fn normalize_record(mut record: FilingRecord, stats: &mut CleaningStats) -> FilingRecord {
    if !record.return_filed {
        if record.payment_delay_days.take().is_some() {
            stats.nulled_payment_delays += 1;
        }
        if record.voluntary_disclosure.take().is_some() {
            stats.nulled_disclosures += 1;
        }
    }

    if record
        .payment_delay_days
        .is_some_and(|delay| !delay.is_finite() || delay < 0.0)
    {
        record.payment_delay_days = None;
        stats.nulled_payment_delays += 1;
    }
    if record
        .voluntary_disclosure
        .is_some_and(|disclosure| !(0.0..=1.0).contains(&disclosure))
    {
        record.voluntary_disclosure = None;
        stats.nulled_disclosures += 1;
    }
    for amount in [&mut record.estimated_tax, &mut record.actual_tax] {
        if amount.is_some_and(|value| !value.is_finite()) {
            *amount = None;
            stats.nulled_tax_amounts += 1;
        }
    }

    record
}
