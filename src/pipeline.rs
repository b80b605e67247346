//! The risk pipeline
//!
//! Runs the stages strictly in order: (cleaning) → feature aggregation →
//! inner join with the profile table → scoring → tier classification. Every
//! derived value is recomputed from the inputs, so running the pipeline twice
//! on the same tables gives the same result.

use itertools::Itertools;
use log::{debug, info, warn};
use rustc_hash::FxHashSet;
use std::path::Path;
use std::time::Instant;

use crate::algorithm::cleaning::{CleaningStats, clean_records};
use crate::algorithm::features::FeatureAggregator;
use crate::algorithm::scoring::risk_score;
use crate::algorithm::tiers::TierEdges;
use crate::config::{RiskConfig, UndefinedPolicy};
use crate::error::{Error, Result};
use crate::loader::{load_filings, load_profiles};
use crate::models::{ExcludedTaxpayer, FilingRecord, ProfileTable, ScoredTaxpayer, TaxpayerFeatures};
use crate::utils::logging::{log_stage_complete, log_stage_start};

/// Outcome of the inner join between feature rows and profiles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Distinct taxpayers in the filing records
    pub taxpayers_with_filings: usize,
    /// Distinct taxpayers in the profile table
    pub profiles: usize,
    /// Taxpayers present in both tables
    pub joined: usize,
    /// Taxpayers dropped because they have no profile
    pub filings_without_profile: usize,
    /// Profiles dropped because the taxpayer has no filing record
    pub profiles_without_filings: usize,
}

/// Result of a pipeline run
#[derive(Debug, Clone)]
pub struct RiskRun {
    /// Scored taxpayers in `TaxpayerID` order
    pub scored: Vec<ScoredTaxpayer>,
    /// Joined taxpayers that could not be scored
    pub excluded: Vec<ExcludedTaxpayer>,
    pub join: JoinStats,
    /// Tertile edges of the scored cohort
    pub edges: TierEdges,
    /// Filing records that entered aggregation
    pub record_count: usize,
    /// Present when the cleaning stage ran
    pub cleaning: Option<CleaningStats>,
}

/// Batch pipeline turning filing records and profiles into risk tiers
#[derive(Debug, Clone, Default)]
pub struct RiskPipeline {
    config: RiskConfig,
}

impl RiskPipeline {
    #[must_use]
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Load both tables from disk and run the pipeline
    ///
    /// The profile table is returned alongside the run so the report can
    /// carry its descriptive columns.
    pub fn run_files(&self, filings: &Path, profiles: &Path) -> Result<(RiskRun, ProfileTable)> {
        let records = load_filings(filings)?;
        let profiles = load_profiles(profiles)?;
        let run = self.run(records, &profiles)?;
        Ok((run, profiles))
    }

    /// Run every stage over loaded tables
    ///
    /// # Errors
    /// * `Error::UndefinedScore` under `UndefinedPolicy::Fail`
    /// * any classification error from [`TierEdges`]
    pub fn run(&self, records: Vec<FilingRecord>, profiles: &ProfileTable) -> Result<RiskRun> {
        let (records, cleaning) = match &self.config.cleaning {
            Some(cleaning_config) => {
                let start = Instant::now();
                log_stage_start("Cleaning", records.len());
                let (records, stats) = clean_records(records, cleaning_config);
                log_stage_complete("Cleaning", records.len(), start.elapsed());
                (records, Some(stats))
            }
            None => (records, None),
        };
        let record_count = records.len();

        let start = Instant::now();
        log_stage_start("Feature aggregation", record_count);
        let features = FeatureAggregator::from_config(&self.config).aggregate(&records);
        log_stage_complete("Feature aggregation", features.len(), start.elapsed());

        let (joined, join) = join_profiles(features, profiles);

        let start = Instant::now();
        log_stage_start("Scoring", joined.len());
        let (scorable, excluded) = self.score(joined)?;
        log_stage_complete("Scoring", scorable.len(), start.elapsed());

        let scores: Vec<f64> = scorable.iter().map(|(_, score)| *score).collect();
        let edges = TierEdges::from_scores(&scores)?;
        let levels = edges.classify(&scores)?;

        let scored: Vec<ScoredTaxpayer> = scorable
            .into_iter()
            .zip(levels)
            .map(|((features, risk_score), risk_level)| ScoredTaxpayer {
                features,
                risk_score,
                risk_level,
            })
            .collect();
        info!(
            "Classified {} taxpayers into risk tiers (edges {:?})",
            scored.len(),
            edges.edges()
        );

        Ok(RiskRun {
            scored,
            excluded,
            join,
            edges,
            record_count,
            cleaning,
        })
    }

    /// Score joined taxpayers, applying the undefined-score policy
    fn score(
        &self,
        joined: Vec<TaxpayerFeatures>,
    ) -> Result<(Vec<(TaxpayerFeatures, f64)>, Vec<ExcludedTaxpayer>)> {
        let mut scorable = Vec::with_capacity(joined.len());
        let mut excluded = Vec::new();

        for features in joined {
            if let Some(score) = risk_score(&features) {
                scorable.push((features, score));
                continue;
            }

            let exclusion = ExcludedTaxpayer {
                taxpayer_id: features.taxpayer_id.clone(),
                undefined_features: features.undefined_features(),
            };
            match self.config.undefined_policy {
                UndefinedPolicy::Fail => {
                    return Err(Error::UndefinedScore {
                        taxpayer_id: exclusion.taxpayer_id,
                        features: exclusion.undefined_features.iter().join(", "),
                    }
                    .into());
                }
                UndefinedPolicy::Exclude => {
                    warn!(
                        "Excluding taxpayer {} from classification: {}",
                        exclusion.taxpayer_id,
                        exclusion.reason()
                    );
                    excluded.push(exclusion);
                }
            }
        }

        if !excluded.is_empty() {
            warn!(
                "{} of {} taxpayers excluded because their risk score is undefined",
                excluded.len(),
                excluded.len() + scorable.len()
            );
        }
        Ok((scorable, excluded))
    }
}

/// Inner join of feature rows with the profile table
///
/// Keeps the feature order. Taxpayers missing from either side are dropped;
/// the counts are logged and returned, the identifiers logged at debug level.
pub fn join_profiles(
    features: Vec<TaxpayerFeatures>,
    profiles: &ProfileTable,
) -> (Vec<TaxpayerFeatures>, JoinStats) {
    let taxpayers_with_filings = features.len();
    let filing_ids: FxHashSet<&str> = features
        .iter()
        .map(|features| features.taxpayer_id.as_str())
        .collect();
    let profiles_without_filings: Vec<&str> = profiles
        .ids()
        .iter()
        .map(String::as_str)
        .unique()
        .filter(|id| !filing_ids.contains(id))
        .collect();
    let profiles_without_filings_count = profiles_without_filings.len();
    if !profiles_without_filings.is_empty() {
        debug!(
            "Profiles without filing records: {}",
            profiles_without_filings.iter().join(", ")
        );
    }

    let (joined, unmatched): (Vec<_>, Vec<_>) = features
        .into_iter()
        .partition(|features| profiles.contains(&features.taxpayer_id));
    if !unmatched.is_empty() {
        debug!(
            "Filing taxpayers without profile: {}",
            unmatched.iter().map(|f| f.taxpayer_id.as_str()).join(", ")
        );
    }

    let join = JoinStats {
        taxpayers_with_filings,
        profiles: profiles.len(),
        joined: joined.len(),
        filings_without_profile: unmatched.len(),
        profiles_without_filings: profiles_without_filings_count,
    };
    info!(
        "Joined {} taxpayers with profiles ({} without profile, {} profiles without filings)",
        join.joined, join.filings_without_profile, join.profiles_without_filings
    );

    (joined, join)
}
