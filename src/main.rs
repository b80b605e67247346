use clap::Parser;
use compliance_risk::report::{build_report_batch, join_profile_columns, print_report, write_report};
use compliance_risk::{CleaningConfig, Result, RiskConfig, RiskPipeline, RunStatistics, UndefinedPolicy};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

/// Score taxpayers' compliance risk and rank them into risk tiers
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Filing records table (CSV, Parquet, or a directory of them)
    filings: PathBuf,

    /// Taxpayer profile table (CSV, Parquet, or a directory of them)
    profiles: PathBuf,

    /// Write the report to this file (.csv, .parquet or .json) instead of printing it
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Clean missing/invalid values and clip outliers before aggregation
    #[arg(long)]
    clean: bool,

    /// Width of the outlier clipping fence in interquartile ranges
    #[arg(long, default_value = "1.5")]
    iqr_multiplier: f64,

    /// Abort when a taxpayer's risk score is undefined instead of excluding it
    #[arg(long)]
    fail_on_undefined: bool,

    /// Treat taxpayers without records in the recent window as having no recent issues
    #[arg(long)]
    fill_missing_recent: bool,

    /// Aggregate features in parallel
    #[arg(long)]
    parallel: bool,

    /// Include the five feature columns in the report
    #[arg(long)]
    with_features: bool,

    /// Include the profile's descriptive columns in the report
    #[arg(long)]
    with_profile: bool,

    /// Print a run summary after the report
    #[arg(long)]
    summary: bool,
}

impl Args {
    fn config(&self) -> RiskConfig {
        RiskConfig {
            undefined_policy: if self.fail_on_undefined {
                UndefinedPolicy::Fail
            } else {
                UndefinedPolicy::Exclude
            },
            fill_missing_recent_window: self.fill_missing_recent,
            cleaning: self.clean.then(|| CleaningConfig {
                iqr_multiplier: self.iqr_multiplier,
            }),
            parallel: self.parallel,
            ..RiskConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.config();
    info!("{config}");

    let start = Instant::now();
    let pipeline = RiskPipeline::new(config);
    let (run, profiles) = pipeline.run_files(&args.filings, &args.profiles)?;

    let mut report = build_report_batch(&run.scored, args.with_features)?;
    if args.with_profile {
        report = join_profile_columns(&report, &run.scored, &profiles)?;
    }

    match &args.output {
        Some(path) => write_report(path, &report)?,
        None => print_report(&report)?,
    }

    if args.summary {
        println!("{}", RunStatistics::summarize(&run).generate_summary());
    }

    info!(
        "Scored {} taxpayers ({} excluded) in {:?}",
        run.scored.len(),
        run.excluded.len(),
        start.elapsed()
    );
    Ok(())
}
