//! Configuration for the risk pipeline.

use std::fmt;

use crate::algorithm::cleaning::CleaningConfig;

/// What to do with a taxpayer whose risk score is undefined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UndefinedPolicy {
    /// Leave the taxpayer out of classification and report it as excluded
    #[default]
    Exclude,
    /// Abort the run
    Fail,
}

impl fmt::Display for UndefinedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exclude => f.write_str("exclude"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

/// Configuration for the `RiskPipeline`
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Handling of taxpayers with undefined features
    pub undefined_policy: UndefinedPolicy,
    /// Treat a taxpayer with no record in the recent window as having no recent issues
    pub fill_missing_recent_window: bool,
    /// Number of most recent tax years that form the recent window
    pub recent_window_years: i32,
    /// Payment delay (days) above which a recent record counts as an issue
    pub late_payment_threshold_days: f64,
    /// Run the cleaning stage before aggregation
    pub cleaning: Option<CleaningConfig>,
    /// Aggregate features with rayon
    pub parallel: bool,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            undefined_policy: UndefinedPolicy::Exclude,
            fill_missing_recent_window: false,
            recent_window_years: 2,
            late_payment_threshold_days: 30.0,
            cleaning: None,
            parallel: false,
        }
    }
}

impl fmt::Display for RiskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Risk Pipeline Configuration:")?;
        writeln!(f, "  Undefined Scores: {}", self.undefined_policy)?;
        writeln!(
            f,
            "  Missing Recent Window Filled: {}",
            self.fill_missing_recent_window
        )?;
        writeln!(f, "  Recent Window Years: {}", self.recent_window_years)?;
        writeln!(
            f,
            "  Late Payment Threshold: {} days",
            self.late_payment_threshold_days
        )?;
        if let Some(cleaning) = &self.cleaning {
            writeln!(f, "  Cleaning IQR Multiplier: {}", cleaning.iqr_multiplier)?;
        }
        writeln!(f, "  Parallel Aggregation: {}", self.parallel)?;
        Ok(())
    }
}
