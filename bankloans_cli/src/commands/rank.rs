//! The `rank` subcommand: chart and rank a saved analysis by another metric.
//! Nothing is fetched.

use std::path::PathBuf;

use anyhow::Result;
use bankloans_lib::{proportions, top_ranked, AnalysisSnapshot, Metric};
use clap::Args;

use super::analyze::parse_metric;
use crate::output::{print_chart_section, print_json, print_ranking_section, OutputFormat};

#[derive(Args)]
pub struct RankArgs {
    /// Snapshot written by `analyze --save`
    #[arg(long)]
    pub from: PathBuf,

    /// Metric to rank by: rconf158, rconf159 or total
    #[arg(long, default_value = "total", value_parser = parse_metric)]
    pub metric: Metric,
}

pub fn run(args: &RankArgs, format: &OutputFormat) -> Result<()> {
    let snapshot = AnalysisSnapshot::load(&args.from)?;
    eprintln!(
        "Loaded {} results for {} (fetched {})",
        snapshot.results.len(),
        snapshot.reporting_period,
        snapshot.generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    let ranking = top_ranked(&snapshot.results, args.metric);
    match format {
        OutputFormat::Json => print_json(&ranking),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["Rank", "Bank Name", args.metric.label()])?;
            for e in &ranking {
                wtr.write_record([e.rank.to_string(), e.bank_name.clone(), e.value.to_string()])?;
            }
            wtr.flush()?;
        }
        OutputFormat::Table | OutputFormat::Markdown => {
            print_chart_section(args.metric, &proportions(&snapshot.results, args.metric));
            println!();
            print_ranking_section(args.metric, &ranking, format);
        }
    }
    Ok(())
}
