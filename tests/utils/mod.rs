//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use compliance_risk::{FilingRecord, ProfileTable, RecordBatch};

/// Build a filing records batch in the layout of the input files
///
/// Years and the disclosure indicator are stored as integers, the way the
/// CSV reader infers them.
pub fn filings_batch(records: &[FilingRecord]) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("TaxpayerID", DataType::Utf8, false),
        Field::new("Year", DataType::Int64, false),
        Field::new("ReturnFiled", DataType::Boolean, false),
        Field::new("PaymentDelayDays", DataType::Float64, true),
        Field::new("VoluntaryDisclosure", DataType::Int64, true),
        Field::new("EstimatedTax", DataType::Float64, true),
        Field::new("ActualTax", DataType::Float64, true),
    ]);

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.taxpayer_id.as_str()),
        )),
        Arc::new(Int64Array::from_iter_values(
            records.iter().map(|r| i64::from(r.year)),
        )),
        Arc::new(BooleanArray::from_iter(
            records.iter().map(|r| Some(r.return_filed)),
        )),
        Arc::new(Float64Array::from_iter(
            records.iter().map(|r| r.payment_delay_days),
        )),
        Arc::new(Int64Array::from_iter(
            records
                .iter()
                .map(|r| r.voluntary_disclosure.map(|v| v as i64)),
        )),
        Arc::new(Float64Array::from_iter(records.iter().map(|r| r.estimated_tax))),
        Arc::new(Float64Array::from_iter(records.iter().map(|r| r.actual_tax))),
    ];

    RecordBatch::try_new(Arc::new(schema), columns).unwrap()
}

/// Build a profile batch with a region and a headcount attribute per taxpayer
pub fn profiles_batch(ids: &[&str]) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("TaxpayerID", DataType::Utf8, false),
        Field::new("Region", DataType::Utf8, true),
        Field::new("Employees", DataType::Int64, true),
    ]);
    let regions: Vec<String> = ids.iter().map(|id| format!("Region-{id}")).collect();

    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(StringArray::from_iter_values(ids.iter().copied())),
            Arc::new(StringArray::from_iter_values(
                regions.iter().map(String::as_str),
            )),
            Arc::new(Int64Array::from_iter_values(
                (0..ids.len()).map(|i| i as i64 * 10),
            )),
        ],
    )
    .unwrap()
}

pub fn profiles(ids: &[&str]) -> ProfileTable {
    ProfileTable::from_batches(&[profiles_batch(ids)]).unwrap()
}

/// The two-year taxpayer from the worked example: score 2.55
pub fn example_taxpayer(id: &str) -> Vec<FilingRecord> {
    vec![
        FilingRecord::filed(id, 2023, 0.0, 0.0, 1000.0, 1000.0),
        FilingRecord::filed(id, 2024, 45.0, 0.0, 1000.0, 800.0),
    ]
}

/// Always filed on time, no underpayment: score 2/180 · (2/3)
pub fn compliant_taxpayer(id: &str) -> Vec<FilingRecord> {
    vec![
        FilingRecord::filed(id, 2022, 0.0, 0.0, 500.0, 500.0),
        FilingRecord::filed(id, 2023, 2.0, 0.0, 500.0, 500.0),
        FilingRecord::filed(id, 2024, 0.0, 0.0, 500.0, 500.0),
    ]
}

/// Stopped filing after 2022: score 2 + 1 + 2.5 + 2 = 7.5
pub fn delinquent_taxpayer(id: &str) -> Vec<FilingRecord> {
    vec![
        FilingRecord::filed(id, 2022, 90.0, 0.0, 2000.0, 1000.0),
        FilingRecord::not_filed(id, 2023, 2000.0, 0.0),
        FilingRecord::not_filed(id, 2024, 2000.0, 0.0),
    ]
}

/// Three taxpayers with distinct scores, one per tier
pub fn three_tier_records() -> Vec<FilingRecord> {
    let mut records = compliant_taxpayer("A");
    records.extend(example_taxpayer("B"));
    records.extend(delinquent_taxpayer("C"));
    records
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
