//! Tests for feature aggregation and scoring

mod utils;

use compliance_risk::{
    FeatureAggregator, FilingRecord, RiskConfig, TaxpayerFeatures, risk_score,
};
use utils::{assert_close, compliant_taxpayer, delinquent_taxpayer, example_taxpayer};

fn aggregate(records: &[FilingRecord]) -> Vec<TaxpayerFeatures> {
    FeatureAggregator::default().aggregate(records)
}

fn features_of<'a>(features: &'a [TaxpayerFeatures], id: &str) -> &'a TaxpayerFeatures {
    features
        .iter()
        .find(|f| f.taxpayer_id == id)
        .unwrap_or_else(|| panic!("no features for {id}"))
}

#[test]
fn test_worked_example() {
    let features = aggregate(&example_taxpayer("T1"));
    assert_eq!(features.len(), 1);

    let t1 = &features[0];
    assert_eq!(t1.missed_filings_rate, 0.0);
    assert_close(t1.avg_payment_delay.unwrap(), 22.5);
    assert_close(t1.underpayment_ratio.unwrap(), 0.1);
    assert_eq!(t1.recent_issues, Some(true));
    assert_eq!(t1.voluntary_disclosure_rate, Some(0.0));

    assert_close(risk_score(t1).unwrap(), 2.55);
}

#[test]
fn test_missed_filings_rate_bounds() {
    let mut records = vec![
        FilingRecord::not_filed("never", 2023, 100.0, 0.0),
        FilingRecord::not_filed("never", 2024, 100.0, 0.0),
    ];
    records.extend(compliant_taxpayer("always"));
    records.extend(delinquent_taxpayer("sometimes"));

    let features = aggregate(&records);
    assert_eq!(features_of(&features, "never").missed_filings_rate, 1.0);
    assert_eq!(features_of(&features, "always").missed_filings_rate, 0.0);
    let sometimes = features_of(&features, "sometimes").missed_filings_rate;
    assert_close(sometimes, 2.0 / 3.0);

    for f in &features {
        assert!((0.0..=1.0).contains(&f.missed_filings_rate));
    }
}

#[test]
fn test_never_filed_has_undefined_filed_only_features() {
    let records = vec![
        FilingRecord::not_filed("never", 2023, 100.0, 0.0),
        FilingRecord::not_filed("never", 2024, 100.0, 0.0),
    ];
    let features = aggregate(&records);

    let never = &features[0];
    assert_eq!(never.avg_payment_delay, None);
    assert_eq!(never.voluntary_disclosure_rate, None);
    assert_close(never.underpayment_ratio.unwrap(), 1.0);
    assert_eq!(never.recent_issues, Some(true));
    assert_eq!(risk_score(never), None);
}

#[test]
fn test_recent_issues_window() {
    let records = vec![
        // Late in 2023, inside the window ending at 2024
        FilingRecord::filed("late", 2023, 31.0, 0.0, 100.0, 100.0),
        FilingRecord::filed("late", 2024, 0.0, 0.0, 100.0, 100.0),
        // Exactly at the threshold is not late
        FilingRecord::filed("on-threshold", 2024, 30.0, 0.0, 100.0, 100.0),
        // Unfiled in 2024
        FilingRecord::filed("unfiled", 2023, 0.0, 0.0, 100.0, 100.0),
        FilingRecord::not_filed("unfiled", 2024, 100.0, 0.0),
        // Issues only before the window
        FilingRecord::not_filed("old", 2021, 100.0, 0.0),
        FilingRecord::filed("old", 2022, 200.0, 0.0, 100.0, 100.0),
        FilingRecord::filed("old", 2023, 0.0, 0.0, 100.0, 100.0),
        // No record inside the window at all
        FilingRecord::filed("absent", 2020, 0.0, 0.0, 100.0, 100.0),
    ];
    let features = aggregate(&records);

    assert_eq!(features_of(&features, "late").recent_issues, Some(true));
    assert_eq!(features_of(&features, "on-threshold").recent_issues, Some(false));
    assert_eq!(features_of(&features, "unfiled").recent_issues, Some(true));
    assert_eq!(features_of(&features, "old").recent_issues, Some(false));
    assert_eq!(features_of(&features, "absent").recent_issues, None);
    assert_eq!(risk_score(features_of(&features, "absent")), None);
}

#[test]
fn test_fill_missing_recent_window() {
    let records = vec![
        FilingRecord::filed("absent", 2020, 0.0, 0.0, 100.0, 100.0),
        FilingRecord::filed("present", 2024, 0.0, 0.0, 100.0, 100.0),
    ];
    let config = RiskConfig {
        fill_missing_recent_window: true,
        ..RiskConfig::default()
    };
    let features = FeatureAggregator::from_config(&config).aggregate(&records);

    let absent = features_of(&features, "absent");
    assert_eq!(absent.recent_issues, Some(false));
    assert_eq!(risk_score(absent), Some(0.0));
}

#[test]
fn test_zero_estimated_tax_is_never_coerced() {
    let mut records = example_taxpayer("T1");
    records.push(FilingRecord::filed("T1", 2022, 0.0, 0.0, 0.0, 50.0));

    let features = aggregate(&records);
    let t1 = &features[0];
    assert_eq!(t1.underpayment_ratio, None);
    assert_eq!(risk_score(t1), None);
    assert_eq!(
        t1.undefined_features(),
        vec![compliance_risk::Feature::UnderpaymentRatio]
    );
}

#[test]
fn test_missing_amounts_are_left_out_of_the_mean() {
    let mut records = example_taxpayer("T1");
    let mut missing = FilingRecord::filed("T1", 2022, 10.0, 1.0, 1000.0, 0.0);
    missing.actual_tax = None;
    missing.payment_delay_days = None;
    records.push(missing);

    let features = aggregate(&records);
    let t1 = &features[0];
    assert_close(t1.underpayment_ratio.unwrap(), 0.1);
    assert_close(t1.avg_payment_delay.unwrap(), 22.5);
    assert_close(t1.voluntary_disclosure_rate.unwrap(), 1.0 / 3.0);
}

#[test]
fn test_output_is_ordered_by_taxpayer_id() {
    let mut records = delinquent_taxpayer("C");
    records.extend(example_taxpayer("A"));
    records.extend(compliant_taxpayer("B"));

    let ids: Vec<String> = aggregate(&records)
        .into_iter()
        .map(|f| f.taxpayer_id)
        .collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
}

#[test]
fn test_parallel_matches_sequential() {
    let mut records = Vec::new();
    for i in 0..200 {
        let id = format!("T{i:03}");
        for year in 2015..=2024 {
            let delay = f64::from((i * 7 + year) % 60);
            let estimated = 1000.0 + f64::from(i);
            let actual = estimated - f64::from((i + year) % 13) * 10.0;
            if (i + year) % 5 == 0 {
                records.push(FilingRecord::not_filed(id.as_str(), year, estimated, actual));
            } else {
                let disclosure = f64::from((i + year) % 2);
                records.push(FilingRecord::filed(
                    id.as_str(),
                    year,
                    delay,
                    disclosure,
                    estimated,
                    actual,
                ));
            }
        }
    }

    let sequential = FeatureAggregator::default().aggregate(&records);
    let parallel = FeatureAggregator::from_config(&RiskConfig {
        parallel: true,
        ..RiskConfig::default()
    })
    .aggregate(&records);

    assert_eq!(sequential.len(), 200);
    assert_eq!(sequential, parallel);
}

#[test]
fn test_empty_input() {
    assert!(aggregate(&[]).is_empty());
}
