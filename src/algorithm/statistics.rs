//! Run statistics and summaries
//!
//! This module provides the quantile helper shared by the cleaning and tier
//! stages, and the summary printed at the end of a run.

use itertools::{Itertools, MinMaxResult};

use crate::algorithm::cleaning::CleaningStats;
use crate::models::RiskLevel;
use crate::pipeline::RiskRun;

/// Linearly interpolated quantile of sorted, non-empty values
///
/// The quantile `q` sits at position `q · (n − 1)` between order statistics.
#[must_use]
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Functions for run statistics and summaries
pub struct RunStatistics;

impl RunStatistics {
    /// Collect the counts describing a finished run
    #[must_use]
    pub fn summarize(run: &RiskRun) -> RunSummary {
        let tier_counts = RiskLevel::ALL.map(|level| {
            run.scored
                .iter()
                .filter(|scored| scored.risk_level == level)
                .count()
        });

        let score_range = match run.scored.iter().map(|scored| scored.risk_score).minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(score) => Some((score, score)),
            MinMaxResult::MinMax(min, max) => Some((min, max)),
        };

        RunSummary {
            filing_records: run.record_count,
            taxpayers_with_filings: run.join.taxpayers_with_filings,
            profiles: run.join.profiles,
            joined: run.join.joined,
            filings_without_profile: run.join.filings_without_profile,
            profiles_without_filings: run.join.profiles_without_filings,
            scored: run.scored.len(),
            excluded: run.excluded.len(),
            tier_counts,
            tier_edges: run.edges.edges(),
            score_range,
            cleaning: run.cleaning.clone(),
        }
    }
}

/// Structure containing the counts of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Filing records that entered aggregation
    pub filing_records: usize,
    /// Distinct taxpayers in the filing records
    pub taxpayers_with_filings: usize,
    /// Distinct taxpayers in the profile table
    pub profiles: usize,
    /// Taxpayers present in both tables
    pub joined: usize,
    pub filings_without_profile: usize,
    pub profiles_without_filings: usize,
    /// Taxpayers with a score and a tier
    pub scored: usize,
    /// Taxpayers left out because their score is undefined
    pub excluded: usize,
    /// Scored taxpayers per tier, Low to High
    pub tier_counts: [usize; 3],
    pub tier_edges: [f64; 4],
    pub score_range: Option<(f64, f64)>,
    pub cleaning: Option<CleaningStats>,
}

impl RunSummary {
    /// Scored taxpayers in a tier
    #[must_use]
    pub fn tier_count(&self, level: RiskLevel) -> usize {
        self.tier_counts[level as usize]
    }

    /// Generate a printable summary of the run
    #[must_use]
    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("Compliance Risk Summary:\n");
        summary.push_str(&format!("  Filing Records: {}\n", self.filing_records));
        summary.push_str(&format!(
            "  Taxpayers With Filings: {}\n",
            self.taxpayers_with_filings
        ));
        summary.push_str(&format!("  Taxpayer Profiles: {}\n", self.profiles));
        summary.push_str(&format!("  Joined Taxpayers: {}\n", self.joined));
        summary.push_str(&format!(
            "    Filings Without Profile: {}\n",
            self.filings_without_profile
        ));
        summary.push_str(&format!(
            "    Profiles Without Filings: {}\n",
            self.profiles_without_filings
        ));
        summary.push_str(&format!("  Scored Taxpayers: {}\n", self.scored));
        summary.push_str(&format!("  Excluded (Undefined Score): {}\n", self.excluded));

        if let Some(cleaning) = &self.cleaning {
            summary.push_str("\nCleaning:\n");
            summary.push_str(&format!("  Values Set Missing: {}\n", cleaning.nulled_total()));
            summary.push_str(&format!("  Values Clipped: {}\n", cleaning.clipped_total()));
        }

        summary.push_str("\nRisk Tiers:\n");
        for level in RiskLevel::ALL {
            let count = self.tier_count(level);
            let percentage = if self.scored > 0 {
                (count as f64 / self.scored as f64) * 100.0
            } else {
                0.0
            };
            summary.push_str(&format!("  {level}: {count} ({percentage:.1}%)\n"));
        }

        let [_, low_upper, medium_upper, _] = self.tier_edges;
        summary.push_str(&format!(
            "  Tier Edges: Low <= {low_upper:.4} < Medium <= {medium_upper:.4} < High\n"
        ));
        if let Some((min, max)) = self.score_range {
            summary.push_str(&format!("  Score Range: {min:.4} to {max:.4}\n"));
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_interpolation() {
        let sorted = [1.0, 2.0, 4.0, 8.0];
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 1.0), 8.0);
        assert_eq!(quantile(&sorted, 0.5), 3.0);
        assert!((quantile(&sorted, 1.0 / 3.0) - 2.0).abs() < 1e-12);
        assert_eq!(quantile(&[7.0], 0.25), 7.0);
    }
}
