//! Filing records, one row per taxpayer per tax year

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::arrow::{extract_boolean, extract_float64, extract_int32, extract_string};
use arrow::record_batch::RecordBatch;

/// Column names of the filing records table
pub mod columns {
    pub const TAXPAYER_ID: &str = "TaxpayerID";
    pub const YEAR: &str = "Year";
    pub const RETURN_FILED: &str = "ReturnFiled";
    pub const PAYMENT_DELAY_DAYS: &str = "PaymentDelayDays";
    pub const VOLUNTARY_DISCLOSURE: &str = "VoluntaryDisclosure";
    pub const ESTIMATED_TAX: &str = "EstimatedTax";
    pub const ACTUAL_TAX: &str = "ActualTax";
}

const TABLE_NAME: &str = "filings";

/// One taxpayer's compliance data for one tax year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingRecord {
    pub taxpayer_id: String,
    pub year: i32,
    pub return_filed: bool,
    /// Only meaningful when the return was filed
    pub payment_delay_days: Option<f64>,
    /// Indicator in [0, 1], only meaningful when the return was filed
    pub voluntary_disclosure: Option<f64>,
    pub estimated_tax: Option<f64>,
    pub actual_tax: Option<f64>,
}

impl FilingRecord {
    /// Create a record for a filed return
    #[must_use]
    pub fn filed(
        taxpayer_id: impl Into<String>,
        year: i32,
        payment_delay_days: f64,
        voluntary_disclosure: f64,
        estimated_tax: f64,
        actual_tax: f64,
    ) -> Self {
        Self {
            taxpayer_id: taxpayer_id.into(),
            year,
            return_filed: true,
            payment_delay_days: Some(payment_delay_days),
            voluntary_disclosure: Some(voluntary_disclosure),
            estimated_tax: Some(estimated_tax),
            actual_tax: Some(actual_tax),
        }
    }

    /// Create a record for a year in which no return was filed
    #[must_use]
    pub fn not_filed(
        taxpayer_id: impl Into<String>,
        year: i32,
        estimated_tax: f64,
        actual_tax: f64,
    ) -> Self {
        Self {
            taxpayer_id: taxpayer_id.into(),
            year,
            return_filed: false,
            payment_delay_days: None,
            voluntary_disclosure: None,
            estimated_tax: Some(estimated_tax),
            actual_tax: Some(actual_tax),
        }
    }

    /// Drop the fields that are undefined for an unfiled return
    ///
    /// Input tables sometimes carry a delay or disclosure value on rows where
    /// nothing was filed; those values never reach the aggregates.
    #[must_use]
    pub fn with_filing_status_applied(mut self) -> Self {
        if !self.return_filed {
            self.payment_delay_days = None;
            self.voluntary_disclosure = None;
        }
        self
    }

    /// Per-record underpayment, `(estimated - actual) / estimated`
    ///
    /// Returns `None` when either amount is missing. A zero estimate yields a
    /// non-finite value, which the aggregator treats as undefined.
    #[must_use]
    pub fn underpayment_ratio(&self) -> Option<f64> {
        let estimated = self.estimated_tax?;
        let actual = self.actual_tax?;
        Some((estimated - actual) / estimated)
    }

    /// Whether this record is a recent-window issue: not filed, or paid late
    #[must_use]
    pub fn is_issue(&self, late_payment_threshold_days: f64) -> bool {
        !self.return_filed
            || self
                .payment_delay_days
                .is_some_and(|delay| delay > late_payment_threshold_days)
    }

    /// Build filing records from a record batch
    ///
    /// Every filing column must be present. `TaxpayerID`, `Year` and
    /// `ReturnFiled` must be non-null on every row; the numeric columns may
    /// contain nulls.
    pub fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let ids = extract_string(batch, columns::TAXPAYER_ID, true)?;
        let years = extract_int32(batch, columns::YEAR, true)?;
        let filed = extract_boolean(batch, columns::RETURN_FILED, true)?;
        let delays = extract_float64(batch, columns::PAYMENT_DELAY_DAYS, true)?;
        let disclosures = extract_float64(batch, columns::VOLUNTARY_DISCLOSURE, true)?;
        let estimated = extract_float64(batch, columns::ESTIMATED_TAX, true)?;
        let actual = extract_float64(batch, columns::ACTUAL_TAX, true)?;

        let mut records = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let taxpayer_id = ids[row]
                .clone()
                .ok_or_else(|| missing_value(columns::TAXPAYER_ID, row))?;
            let year = years[row].ok_or_else(|| missing_value(columns::YEAR, row))?;
            let return_filed = filed[row].ok_or_else(|| missing_value(columns::RETURN_FILED, row))?;

            records.push(
                Self {
                    taxpayer_id,
                    year,
                    return_filed,
                    payment_delay_days: delays[row],
                    voluntary_disclosure: disclosures[row],
                    estimated_tax: estimated[row],
                    actual_tax: actual[row],
                }
                .with_filing_status_applied(),
            );
        }

        Ok(records)
    }

    /// Build filing records from all batches of a table
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Vec<Self>> {
        let mut records = Vec::new();
        for batch in batches {
            records.extend(Self::from_batch(batch)?);
        }

        if records.is_empty() {
            return Err(Error::EmptyInput {
                table: TABLE_NAME.to_string(),
            }
            .into());
        }

        debug!("Read {} filing records from {} batches", records.len(), batches.len());
        Ok(records)
    }
}

fn missing_value(column: &str, row: usize) -> anyhow::Error {
    Error::MissingValue {
        table: TABLE_NAME.to_string(),
        column: column.to_string(),
        row,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filing_status_clears_unfiled_fields() {
        let mut record = FilingRecord::not_filed("T1", 2024, 1000.0, 0.0);
        record.payment_delay_days = Some(12.0);
        record.voluntary_disclosure = Some(1.0);

        let record = record.with_filing_status_applied();
        assert_eq!(record.payment_delay_days, None);
        assert_eq!(record.voluntary_disclosure, None);

        let filed = FilingRecord::filed("T1", 2024, 12.0, 1.0, 1000.0, 900.0);
        assert_eq!(filed.clone().with_filing_status_applied(), filed);
    }

    #[test]
    fn test_underpayment_ratio() {
        let record = FilingRecord::filed("T1", 2024, 0.0, 0.0, 1000.0, 800.0);
        assert!((record.underpayment_ratio().unwrap() - 0.2).abs() < 1e-12);

        let zero = FilingRecord::filed("T1", 2024, 0.0, 0.0, 0.0, 800.0);
        assert!(!zero.underpayment_ratio().unwrap().is_finite());

        let mut missing = record.clone();
        missing.actual_tax = None;
        assert_eq!(missing.underpayment_ratio(), None);
    }

    #[test]
    fn test_is_issue() {
        assert!(FilingRecord::not_filed("T1", 2024, 10.0, 10.0).is_issue(30.0));
        assert!(FilingRecord::filed("T1", 2024, 31.0, 0.0, 10.0, 10.0).is_issue(30.0));
        assert!(!FilingRecord::filed("T1", 2024, 30.0, 0.0, 10.0, 10.0).is_issue(30.0));
    }
}
