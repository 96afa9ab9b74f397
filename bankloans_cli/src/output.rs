use std::fmt::Write as _;

use anyhow::Result;
use bankloans_lib::export::write_results_csv;
use bankloans_lib::{Bank, BankResult, ChartError, FetchFailure, Metric, RankedEntry, Slice};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" | "md" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

/// Width of a full (100%) chart bar, in characters.
const CHART_WIDTH: usize = 40;

#[derive(Tabled, Serialize)]
struct BankRow {
    #[tabled(rename = "RSSD ID")]
    #[serde(rename = "RSSD ID")]
    rssd_id: u64,
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "City")]
    #[serde(rename = "City")]
    city: String,
    #[tabled(rename = "County")]
    #[serde(rename = "County")]
    county: String,
    #[tabled(rename = "State")]
    #[serde(rename = "State")]
    state: String,
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Bank Name")]
    bank_name: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "County")]
    county: String,
    #[tabled(rename = "1-4 Family Residential Construction Loans (RCONF158)")]
    residential: String,
    #[tabled(rename = "Other Construction and Land Development Loans (RCONF159)")]
    other: String,
    #[tabled(rename = "Total Construction Loans")]
    total: String,
}

#[derive(Tabled, Serialize)]
struct RankRow {
    #[tabled(rename = "Rank")]
    #[serde(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Bank Name")]
    #[serde(rename = "Bank Name")]
    bank_name: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: i64,
}

#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "Selector")]
    selector: &'static str,
    #[tabled(rename = "Options")]
    options: String,
}

/// Selector lists for the current upstream choices, each headed by "All".
#[derive(Serialize, Debug, Clone)]
pub struct SelectorOptions {
    pub states: Vec<String>,
    pub counties: Vec<String>,
    pub cities: Vec<String>,
}

/// Everything an analysis run shows, serialized as one JSON document.
#[derive(Serialize)]
pub struct AnalysisReport<'a> {
    pub reporting_period: &'a str,
    pub metric: Metric,
    pub results: &'a [BankResult],
    pub ranking: &'a [RankedEntry],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<&'a [Slice]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_error: Option<String>,
    pub errors: Vec<String>,
}

// -- Row builders --

fn build_bank_rows(banks: &[&Bank]) -> Vec<BankRow> {
    banks
        .iter()
        .map(|b| BankRow {
            rssd_id: b.rssd_id,
            name: b.name.clone(),
            city: b.city.clone(),
            county: b.county.clone(),
            state: b.state.clone(),
        })
        .collect()
}

fn build_result_rows(results: &[BankResult]) -> Vec<ResultRow> {
    results
        .iter()
        .map(|r| ResultRow {
            bank_name: r.bank_name.clone(),
            city: r.city.clone(),
            state: r.state.clone(),
            county: r.county.clone(),
            residential: r.residential.to_string(),
            other: r.other.to_string(),
            total: r.total.to_string(),
        })
        .collect()
}

fn build_rank_rows(ranking: &[RankedEntry]) -> Vec<RankRow> {
    ranking
        .iter()
        .map(|e| RankRow {
            rank: e.rank,
            bank_name: e.bank_name.clone(),
            value: e.value,
        })
        .collect()
}

fn build_option_rows(options: &SelectorOptions) -> Vec<OptionRow> {
    vec![
        OptionRow {
            selector: "State",
            options: options.states.join(", "),
        },
        OptionRow {
            selector: "County",
            options: options.counties.join(", "),
        },
        OptionRow {
            selector: "City",
            options: options.cities.join(", "),
        },
    ]
}

fn render<T: Tabled>(rows: Vec<T>, format: &OutputFormat) -> String {
    let mut table = Table::new(rows);
    if *format == OutputFormat::Markdown {
        table.with(Style::markdown());
    }
    table.to_string()
}

// -- Bank listing --

pub fn print_banks(banks: &[&Bank], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&build_bank_rows(banks)),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in build_bank_rows(banks) {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Table | OutputFormat::Markdown => {
            println!("### Selected Banks ({} total)", banks.len());
            println!("{}", render(build_bank_rows(banks), format));
        }
    }
    Ok(())
}

// -- Selector options --

pub fn print_options(options: &SelectorOptions, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(options),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["Selector", "Option"])?;
            for (name, values) in [
                ("State", &options.states),
                ("County", &options.counties),
                ("City", &options.cities),
            ] {
                for v in values {
                    wtr.write_record([name, v.as_str()])?;
                }
            }
            wtr.flush()?;
        }
        OutputFormat::Table | OutputFormat::Markdown => {
            println!("{}", render(build_option_rows(options), format));
        }
    }
    Ok(())
}

// -- Analysis results --

pub fn results_table(results: &[BankResult], format: &OutputFormat) -> String {
    render(build_result_rows(results), format)
}

pub fn ranking_table(ranking: &[RankedEntry], format: &OutputFormat) -> String {
    render(build_rank_rows(ranking), format)
}

pub fn print_results_csv(results: &[BankResult]) -> Result<()> {
    write_results_csv(results, std::io::stdout())?;
    Ok(())
}

/// Prints the results, chart and ranking sections. Each section fails on its
/// own: a chart error is shown in place of the chart and the rest still prints.
pub fn print_analysis(
    period: &str,
    metric: Metric,
    results: &[BankResult],
    chart: &Result<Vec<Slice>, ChartError>,
    ranking: &[RankedEntry],
    failures: &[FetchFailure],
    format: &OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Csv => print_results_csv(results)?,
        OutputFormat::Json => {
            let report = AnalysisReport {
                reporting_period: period,
                metric,
                results,
                ranking,
                chart: chart.as_ref().ok().map(|c| c.as_slice()),
                chart_error: chart.as_ref().err().map(|e| e.to_string()),
                errors: failures.iter().map(failure_message).collect(),
            };
            print_json(&report);
        }
        OutputFormat::Table | OutputFormat::Markdown => {
            for f in failures {
                eprintln!("{}", failure_message(f));
            }
            println!("### Analysis Results ({})", period);
            println!("*Note: All amounts are presented in ones (not thousands).*");
            println!("{}", results_table(results, format));
            println!();
            print_chart_section(metric, chart);
            println!();
            print_ranking_section(metric, ranking, format);
        }
    }
    Ok(())
}

pub fn print_chart_section(metric: Metric, chart: &Result<Vec<Slice>, ChartError>) {
    println!("### {} Distribution", metric.label());
    match chart {
        Ok(slices) => print!("{}", render_chart(slices)),
        Err(e) => println!("Error creating the chart: {}", e),
    }
}

pub fn print_ranking_section(metric: Metric, ranking: &[RankedEntry], format: &OutputFormat) {
    println!("### Top {} Banks by {}", ranking.len(), metric.label());
    if ranking.is_empty() {
        println!("No valid results to rank.");
    } else {
        println!("{}", ranking_table(ranking, format));
    }
}

pub fn failure_message(f: &FetchFailure) -> String {
    format!("Error analyzing {}: {}", f.bank_name, f.message)
}

/// Text rendering of the proportion chart, one line per slice.
pub fn render_chart(slices: &[Slice]) -> String {
    let label_width = slices
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for s in slices {
        let bar_len = (s.share * CHART_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "{:<width$}  {:<bar$}  {:>5.1}%  {}",
            s.label,
            "█".repeat(bar_len),
            s.share * 100.0,
            format_value(s.value),
            width = label_width,
            bar = CHART_WIDTH,
        );
    }
    out
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn format_value(value: i64) -> String {
    if value >= 1_000_000 {
        format!("${:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("${:.1}K", value as f64 / 1_000.0)
    } else {
        format!("${}", value)
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
