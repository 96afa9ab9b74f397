//! The `interactive` subcommand: a line-oriented session that keeps the
//! selectors, period, metric and last result table between commands.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use bankloans_lib::callreport_api::Client;
use bankloans_lib::export::{export_to_path, DEFAULT_EXPORT_FILE};
use bankloans_lib::validation;
use bankloans_lib::{AnalysisSession, AppConfig, Metric, RunOutcome, SessionState};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::analyze::progress_bar;
use super::load_registry;
use super::options::selector_options;
use crate::output::{
    failure_message, print_banks, print_chart_section, print_options, print_ranking_section,
    results_table, OutputFormat,
};

const HELP: &str = "\
Commands:
  state <value|All>    set the state filter
  county <value|All>   set the county filter
  city <value|All>     set the city filter
  period <text>        set the reporting period
  show                 list the selected banks
  options              list the values each selector offers
  run                  fetch call report data for the selected banks
  metric <name>        rconf158, rconf159 or total
  rank                 top 10 banks by the current metric
  chart                distribution by the current metric
  export [path]        write the last results as CSV
  help                 show this message
  quit                 leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    State(String),
    County(String),
    City(String),
    Period(String),
    Show,
    Options,
    Run,
    Metric(String),
    Rank,
    Chart,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let needs_arg = |cmd: fn(String) -> SessionCommand| {
            if rest.is_empty() {
                Err(format!("'{}' needs a value", word))
            } else {
                Ok(cmd(rest.to_string()))
            }
        };

        match word.to_lowercase().as_str() {
            "state" => needs_arg(SessionCommand::State),
            "county" => needs_arg(SessionCommand::County),
            "city" => needs_arg(SessionCommand::City),
            "period" => needs_arg(SessionCommand::Period),
            "metric" => needs_arg(SessionCommand::Metric),
            "show" => Ok(SessionCommand::Show),
            "options" => Ok(SessionCommand::Options),
            "run" => Ok(SessionCommand::Run),
            "rank" => Ok(SessionCommand::Rank),
            "chart" => Ok(SessionCommand::Chart),
            "export" => Ok(SessionCommand::Export(
                (!rest.is_empty()).then(|| PathBuf::from(rest)),
            )),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
            other => Err(format!("Unknown command '{}'. Type 'help' for a list.", other)),
        }
    }
}

/// Builds the service client from the configured credentials.
fn connect(config: &AppConfig) -> Result<Client> {
    Ok(Client::with_base_url(&config.api_base_url, config.credentials()?)?)
}

pub async fn run(config: &AppConfig, format: &OutputFormat) -> Result<()> {
    let registry = load_registry(config)?;
    let mut session = AnalysisSession::new(registry, config.reporting_period.clone());
    let mut client: Option<Client> = None;

    eprintln!(
        "{} banks loaded. Reporting period {}. Type 'help' for commands.",
        session.registry().len(),
        session.reporting_period()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("bankloans> ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<SessionCommand>() {
            Ok(c) => c,
            Err(msg) => {
                eprintln!("{}", msg);
                continue;
            }
        };

        match command {
            SessionCommand::Quit => break,
            SessionCommand::Help => println!("{}", HELP),
            SessionCommand::State(v) => match validation::validate_selector(Some(&v)) {
                Ok(sel) => {
                    session.set_state_filter(sel);
                    eprintln!("Selection: {}", session.selection());
                }
                Err(e) => eprintln!("{}", e),
            },
            SessionCommand::County(v) => match validation::validate_selector(Some(&v)) {
                Ok(sel) => {
                    session.set_county_filter(sel);
                    eprintln!("Selection: {}", session.selection());
                }
                Err(e) => eprintln!("{}", e),
            },
            SessionCommand::City(v) => match validation::validate_selector(Some(&v)) {
                Ok(sel) => {
                    session.set_city_filter(sel);
                    eprintln!("Selection: {}", session.selection());
                }
                Err(e) => eprintln!("{}", e),
            },
            SessionCommand::Period(p) => match session.set_reporting_period(&p) {
                Ok(()) => eprintln!("Reporting period: {}", session.reporting_period()),
                Err(e) => eprintln!("{}", e),
            },
            SessionCommand::Show => {
                let banks = session.filtered_banks();
                if banks.is_empty() {
                    eprintln!("No banks match the selected filters.");
                } else {
                    print_banks(&banks, format)?;
                }
            }
            SessionCommand::Options => {
                print_options(
                    &selector_options(session.registry(), session.selection()),
                    format,
                )?;
            }
            SessionCommand::Metric(name) => match name.parse::<Metric>() {
                Ok(m) => {
                    session.set_metric(m);
                    eprintln!("Metric: {}", m.label());
                }
                Err(e) => eprintln!("Error creating the ranking: {}", e),
            },
            SessionCommand::Run => {
                let banks = session.filtered_banks().len();
                if banks == 0 {
                    eprintln!("No banks match the selected filters.");
                    continue;
                }
                if client.is_none() {
                    match connect(config) {
                        Ok(c) => client = Some(c),
                        Err(e) => {
                            eprintln!("Cannot start the analysis: {}", e);
                            continue;
                        }
                    }
                }
                let Some(ref api) = client else {
                    continue;
                };

                let pb = progress_bar(banks);
                let outcome = session
                    .run(api, |done| pb.set_position(done as u64))
                    .await;
                pb.finish_and_clear();

                match outcome {
                    Ok(RunOutcome::NoMatches) => {
                        eprintln!("No banks match the selected filters.")
                    }
                    Ok(RunOutcome::Completed { failures, .. }) => {
                        for f in &failures {
                            eprintln!("{}", failure_message(f));
                        }
                        if let (Some(results), Some(period)) =
                            (session.results(), session.results_period())
                        {
                            println!("### Analysis Results ({})", period);
                            println!("*Note: All amounts are presented in ones (not thousands).*");
                            println!("{}", results_table(results, format));
                        }
                    }
                    Err(e) => eprintln!("{}", e),
                }
            }
            SessionCommand::Rank | SessionCommand::Chart | SessionCommand::Export(_)
                if session.state() == SessionState::NoResults =>
            {
                eprintln!("No results yet. Use 'run' first.");
            }
            SessionCommand::Rank => {
                if let Some(ranking) = session.ranking() {
                    print_ranking_section(session.metric(), &ranking, format);
                }
            }
            SessionCommand::Chart => {
                if let Some(chart) = session.chart() {
                    print_chart_section(session.metric(), &chart);
                }
            }
            SessionCommand::Export(path) => {
                let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));
                if let Some(results) = session.results() {
                    match export_to_path(results, &path) {
                        Ok(()) => eprintln!("Results written to {}", path.display()),
                        Err(e) => eprintln!("Export failed: {}", e),
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selector_commands_with_spaces() {
        assert_eq!(
            "county East Baton Rouge".parse::<SessionCommand>(),
            Ok(SessionCommand::County("East Baton Rouge".to_string()))
        );
        assert_eq!(
            "  STATE   TX ".parse::<SessionCommand>(),
            Ok(SessionCommand::State("TX".to_string()))
        );
    }

    #[test]
    fn selector_command_requires_value() {
        assert!("city".parse::<SessionCommand>().is_err());
        assert!("period   ".parse::<SessionCommand>().is_err());
    }

    #[test]
    fn export_path_is_optional() {
        assert_eq!(
            "export".parse::<SessionCommand>(),
            Ok(SessionCommand::Export(None))
        );
        assert_eq!(
            "export out/loans.csv".parse::<SessionCommand>(),
            Ok(SessionCommand::Export(Some(PathBuf::from("out/loans.csv"))))
        );
    }

    #[test]
    fn bare_commands_and_aliases() {
        assert_eq!("run".parse::<SessionCommand>(), Ok(SessionCommand::Run));
        assert_eq!("Rank".parse::<SessionCommand>(), Ok(SessionCommand::Rank));
        assert_eq!("?".parse::<SessionCommand>(), Ok(SessionCommand::Help));
        assert_eq!("exit".parse::<SessionCommand>(), Ok(SessionCommand::Quit));
    }

    #[test]
    fn metric_value_is_kept_raw() {
        // Unknown metric names are reported when the command runs.
        assert_eq!(
            "metric assets".parse::<SessionCommand>(),
            Ok(SessionCommand::Metric("assets".to_string()))
        );
    }

    #[test]
    fn connect_without_credentials_fails_softly() {
        let config = AppConfig::default();
        let err = connect(&config).err().expect("connect should fail without credentials");
        assert!(err.to_string().contains("BANKLOANS_API_USER"));
    }

    #[test]
    fn connect_with_credentials() {
        let config = AppConfig {
            username: Some("analyst".to_string()),
            token: Some("secret".to_string()),
            ..AppConfig::default()
        };
        let client = connect(&config).unwrap();
        assert_eq!(client.base_url(), config.api_base_url.trim_end_matches('/'));
    }

    #[test]
    fn unknown_command_is_rejected() {
        let err = "download".parse::<SessionCommand>().unwrap_err();
        assert!(err.contains("download"));
    }
}
