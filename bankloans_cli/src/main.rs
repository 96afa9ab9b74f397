mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use bankloans_lib::AppConfig;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "bankloans")]
#[command(about = "Analyze bank construction loans (RCONF158/RCONF159) from call report data")]
struct Cli {
    /// Output format: table, json, csv or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Path to a TOML config file (defaults to ./bankloans.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the bank list CSV (overrides config)
    #[arg(long, global = true)]
    banks: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the banks matching the state/county/city selectors
    Banks(commands::banks::BanksArgs),
    /// Show the values offered by each selector
    Options(commands::options::OptionsArgs),
    /// Fetch call report data for the selected banks and rank them
    Analyze(commands::analyze::AnalyzeArgs),
    /// Re-rank a saved analysis without fetching
    Rank(commands::rank::RankArgs),
    /// Interactive session with persistent selections and results
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bankloans=info".parse()?)
                .add_directive("callreport_api=warn".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.banks {
        config.banks_csv = path;
    }

    match &cli.command {
        Commands::Banks(args) => commands::banks::run(args, &config, &format)?,
        Commands::Options(args) => commands::options::run(args, &config, &format)?,
        Commands::Analyze(args) => commands::analyze::run(args, &config, &format).await?,
        Commands::Rank(args) => commands::rank::run(args, &format)?,
        Commands::Interactive => commands::interactive::run(&config, &format).await?,
    }

    Ok(())
}
