//! Tier classification by score tertiles
//!
//! Tiers are relative: the edges are the exact 0, 1/3, 2/3 and 1 quantiles of
//! the scores of the whole cohort, interpolated linearly between order
//! statistics. Bins are closed on the right, so a score equal to an interior
//! edge falls in the lower tier and equal scores always share a tier.
//!
//! Binning fails explicitly instead of producing fewer tiers: with fewer than
//! three scores, with tied edges, or when a tier would stay empty.

use itertools::Itertools;

use super::statistics::quantile;
use crate::error::{Error, Result};
use crate::models::RiskLevel;

/// Number of tiers produced by the classifier
pub const TIER_COUNT: usize = 3;

/// Quantile edges of a scored cohort
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierEdges {
    edges: [f64; TIER_COUNT + 1],
}

impl TierEdges {
    /// Compute the tertile edges of a cohort
    ///
    /// # Errors
    /// * `Error::NonFiniteScore` when a score is NaN or infinite
    /// * `Error::TooFewScores` when there are fewer than three scores
    /// * `Error::DuplicateBinEdges` when ties collapse two edges
    pub fn from_scores(scores: &[f64]) -> Result<Self> {
        if let Some(index) = scores.iter().position(|score| !score.is_finite()) {
            return Err(Error::NonFiniteScore { index }.into());
        }
        if scores.len() < TIER_COUNT {
            return Err(Error::TooFewScores {
                count: scores.len(),
                tiers: TIER_COUNT,
            }
            .into());
        }

        let sorted: Vec<f64> = scores.iter().copied().sorted_by(f64::total_cmp).collect();
        let mut edges = [0.0; TIER_COUNT + 1];
        for (i, edge) in edges.iter_mut().enumerate() {
            *edge = quantile(&sorted, i as f64 / TIER_COUNT as f64);
        }

        if edges.iter().tuple_windows().any(|(lower, upper)| lower >= upper) {
            return Err(Error::DuplicateBinEdges {
                edges: edges.to_vec(),
            }
            .into());
        }

        Ok(Self { edges })
    }

    /// Tier of a score within this cohort
    #[must_use]
    pub fn level_of(&self, score: f64) -> RiskLevel {
        if score <= self.edges[1] {
            RiskLevel::Low
        } else if score <= self.edges[2] {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    /// Tier of every score, failing if a tier stays empty
    pub fn classify(&self, scores: &[f64]) -> Result<Vec<RiskLevel>> {
        let levels: Vec<RiskLevel> = scores.iter().map(|&score| self.level_of(score)).collect();

        let counts = levels.iter().counts();
        if let Some(level) = RiskLevel::ALL
            .into_iter()
            .find(|level| !counts.contains_key(level))
        {
            return Err(Error::EmptyTier { level }.into());
        }

        Ok(levels)
    }

    #[must_use]
    pub fn edges(&self) -> [f64; TIER_COUNT + 1] {
        self.edges
    }
}

/// Assign a tier to every score of a cohort
///
/// The result has one entry per input score, in input order.
///
/// # Errors
/// Fails when the edges cannot be computed (see [`TierEdges::from_scores`])
/// or when one of the tiers would receive no score.
pub fn classify(scores: &[f64]) -> Result<Vec<RiskLevel>> {
    TierEdges::from_scores(scores)?.classify(scores)
}
