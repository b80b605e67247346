//! Result table construction and output
//!
//! The report is an Arrow record batch with one row per scored taxpayer, in
//! pipeline order: `TaxpayerID`, `RiskScore`, `RiskLevel`, optionally
//! followed by the five features and by the profile's descriptive columns.

use anyhow::Context;
use arrow::array::{ArrayRef, UInt32Array};
use arrow::compute::take;
use arrow::csv::WriterBuilder;
use arrow::json::LineDelimitedWriter;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use arrow_schema::{DataType, Field, FieldRef, Schema};
use parquet::arrow::ArrowWriter;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::loader::TableFormat;
use crate::models::{Feature, ProfileTable, ScoredTaxpayer};
use crate::utils::arrow::get_column_index;
use crate::utils::logging::log_operation_complete;

/// Column names of the report
pub mod columns {
    pub const TAXPAYER_ID: &str = "TaxpayerID";
    pub const RISK_SCORE: &str = "RiskScore";
    pub const RISK_LEVEL: &str = "RiskLevel";
}

#[derive(Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "TaxpayerID")]
    taxpayer_id: &'a str,
    #[serde(rename = "RiskScore")]
    risk_score: f64,
    #[serde(rename = "RiskLevel")]
    risk_level: &'static str,
}

#[derive(Serialize)]
struct DetailedReportRow<'a> {
    #[serde(rename = "TaxpayerID")]
    taxpayer_id: &'a str,
    #[serde(rename = "RiskScore")]
    risk_score: f64,
    #[serde(rename = "RiskLevel")]
    risk_level: &'static str,
    #[serde(rename = "MissedFilingsRate")]
    missed_filings_rate: f64,
    #[serde(rename = "AvgPaymentDelay")]
    avg_payment_delay: Option<f64>,
    #[serde(rename = "VoluntaryDisclosureRate")]
    voluntary_disclosure_rate: Option<f64>,
    #[serde(rename = "UnderpaymentRatio")]
    underpayment_ratio: Option<f64>,
    #[serde(rename = "RecentIssues")]
    recent_issues: Option<bool>,
}

impl<'a> From<&'a ScoredTaxpayer> for ReportRow<'a> {
    fn from(scored: &'a ScoredTaxpayer) -> Self {
        Self {
            taxpayer_id: scored.taxpayer_id(),
            risk_score: scored.risk_score,
            risk_level: scored.risk_level.as_str(),
        }
    }
}

impl<'a> From<&'a ScoredTaxpayer> for DetailedReportRow<'a> {
    fn from(scored: &'a ScoredTaxpayer) -> Self {
        let features = &scored.features;
        Self {
            taxpayer_id: scored.taxpayer_id(),
            risk_score: scored.risk_score,
            risk_level: scored.risk_level.as_str(),
            missed_filings_rate: features.missed_filings_rate,
            avg_payment_delay: features.avg_payment_delay,
            voluntary_disclosure_rate: features.voluntary_disclosure_rate,
            underpayment_ratio: features.underpayment_ratio,
            recent_issues: features.recent_issues,
        }
    }
}

fn report_fields(include_features: bool) -> Vec<FieldRef> {
    let mut fields = vec![
        Field::new(columns::TAXPAYER_ID, DataType::Utf8, false),
        Field::new(columns::RISK_SCORE, DataType::Float64, false),
        Field::new(columns::RISK_LEVEL, DataType::Utf8, false),
    ];
    if include_features {
        fields.push(Field::new(Feature::MissedFilingsRate.name(), DataType::Float64, false));
        fields.push(Field::new(Feature::AvgPaymentDelay.name(), DataType::Float64, true));
        fields.push(Field::new(Feature::VoluntaryDisclosureRate.name(), DataType::Float64, true));
        fields.push(Field::new(Feature::UnderpaymentRatio.name(), DataType::Float64, true));
        fields.push(Field::new(Feature::RecentIssues.name(), DataType::Boolean, true));
    }
    fields.into_iter().map(Arc::new).collect()
}

/// Build the report table from scored taxpayers
///
/// # Arguments
/// * `scored` - Scored taxpayers in output order
/// * `include_features` - Append the five feature columns
pub fn build_report_batch(scored: &[ScoredTaxpayer], include_features: bool) -> Result<RecordBatch> {
    let fields = report_fields(include_features);
    let batch = if include_features {
        let rows: Vec<DetailedReportRow<'_>> = scored.iter().map(DetailedReportRow::from).collect();
        serde_arrow::to_record_batch(&fields, &rows)
    } else {
        let rows: Vec<ReportRow<'_>> = scored.iter().map(ReportRow::from).collect();
        serde_arrow::to_record_batch(&fields, &rows)
    };

    batch.context("Failed to build report record batch")
}

/// Append the profile's descriptive columns to a report
///
/// Rows are matched on `TaxpayerID` through the profile index. Attribute
/// columns whose name clashes with a report column are skipped.
pub fn join_profile_columns(
    report: &RecordBatch,
    scored: &[ScoredTaxpayer],
    profiles: &ProfileTable,
) -> Result<RecordBatch> {
    let indices: UInt32Array = scored
        .iter()
        .map(|taxpayer| {
            profiles
                .row_of(taxpayer.taxpayer_id())
                .map(|row| row as u32)
        })
        .collect();

    let report_schema = report.schema();
    let profile_batch = profiles.batch();
    let profile_schema = profile_batch.schema();

    let mut fields: Vec<FieldRef> = report_schema.fields().iter().cloned().collect();
    let mut arrays: Vec<ArrayRef> = report.columns().to_vec();
    for name in profiles.attribute_columns() {
        if report_schema.index_of(&name).is_ok() {
            log::warn!("Profile column '{name}' clashes with a report column; skipping it");
            continue;
        }
        let idx = get_column_index(profile_batch, &name)?;
        let column = take(profile_batch.column(idx), &indices, None)
            .with_context(|| format!("Failed to align profile column '{name}'"))?;
        fields.push(Arc::new(profile_schema.field(idx).clone().with_nullable(true)));
        arrays.push(column);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("Failed to build report with profile columns")
}

/// Render the report as a text table
pub fn format_report(report: &RecordBatch) -> Result<String> {
    Ok(pretty_format_batches(std::slice::from_ref(report))?.to_string())
}

/// Print the report as a text table on stdout
pub fn print_report(report: &RecordBatch) -> Result<()> {
    println!("{}", format_report(report)?);
    Ok(())
}

/// Write the report to a `.csv`, `.parquet` or `.json` (line-delimited) file
pub fn write_report(path: &Path, report: &RecordBatch) -> Result<()> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let format = TableFormat::from_path(path);
    if !is_json && format.is_none() {
        return Err(Error::UnsupportedFormat {
            path: path.display().to_string(),
        }
        .into());
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;

    match format {
        Some(TableFormat::Csv) => {
            let mut writer = WriterBuilder::new().with_header(true).build(file);
            writer.write(report)?;
        }
        Some(TableFormat::Parquet) => {
            let mut writer = ArrowWriter::try_new(file, report.schema(), None)?;
            writer.write(report)?;
            writer.close()?;
        }
        None => {
            let mut writer = LineDelimitedWriter::new(file);
            writer.write(report)?;
            writer.finish()?;
        }
    }

    log_operation_complete("wrote", path, report.num_rows(), None);
    Ok(())
}
