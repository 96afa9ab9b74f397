//! The `analyze` subcommand: fetch construction loans for the selected banks,
//! then show the table, chart and ranking and optionally export.

use std::path::PathBuf;

use anyhow::Result;
use bankloans_lib::callreport_api::Client;
use bankloans_lib::export::{export_to_path, DEFAULT_EXPORT_FILE};
use bankloans_lib::{AnalysisSession, AppConfig, Metric, RunOutcome};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use super::{load_registry, SelectorArgs};
use crate::output::{print_analysis, OutputFormat};

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub selectors: SelectorArgs,

    /// Reporting period passed to the call report service (e.g. 6/30/2024)
    #[arg(long)]
    pub period: Option<String>,

    /// Metric for the chart and ranking: rconf158, rconf159 or total
    #[arg(long, default_value = "total", value_parser = parse_metric)]
    pub metric: Metric,

    /// Write the results as CSV (defaults to bank_analysis_results.csv)
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILE)]
    pub export: Option<PathBuf>,

    /// Save the results table as JSON for later `rank` runs
    #[arg(long)]
    pub save: Option<PathBuf>,
}

pub fn parse_metric(s: &str) -> Result<Metric, String> {
    s.parse::<Metric>().map_err(|e| e.to_string())
}

pub fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}",
    ) {
        pb.set_style(style);
    }
    pb.set_message("fetching call reports...");
    pb
}

pub async fn run(args: &AnalyzeArgs, config: &AppConfig, format: &OutputFormat) -> Result<()> {
    let registry = load_registry(config)?;
    let mut session = AnalysisSession::new(registry, config.reporting_period.clone());
    session.select(args.selectors.selection()?);
    if let Some(ref period) = args.period {
        session.set_reporting_period(period)?;
    }
    session.set_metric(args.metric);

    let banks = session.filtered_banks().len();
    if banks == 0 {
        eprintln!("No banks match the selected filters.");
        return Ok(());
    }
    eprintln!(
        "Analyzing {} banks for reporting period {}",
        banks,
        session.reporting_period()
    );

    let client = Client::with_base_url(&config.api_base_url, config.credentials()?)?;
    let pb = progress_bar(banks);
    let outcome = session
        .run(&client, |done| pb.set_position(done as u64))
        .await?;
    pb.finish_and_clear();

    let failures = match outcome {
        RunOutcome::NoMatches => {
            eprintln!("No banks match the selected filters.");
            return Ok(());
        }
        RunOutcome::Completed { failures, .. } => failures,
    };

    let (Some(results), Some(chart), Some(ranking)) =
        (session.results(), session.chart(), session.ranking())
    else {
        return Ok(());
    };

    print_analysis(
        session.results_period().unwrap_or(session.reporting_period()),
        session.metric(),
        results,
        &chart,
        &ranking,
        &failures,
        format,
    )?;

    if let Some(ref path) = args.export {
        export_to_path(results, path)?;
        eprintln!("Results written to {}", path.display());
    }

    if let Some(ref path) = args.save {
        if let Some(snapshot) = session.snapshot() {
            snapshot.save(path)?;
            eprintln!("Analysis saved to {}", path.display());
        }
    }

    Ok(())
}
