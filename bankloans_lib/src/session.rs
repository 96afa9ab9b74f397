//! Interaction state for one user session.
//!
//! The session keeps the selector values, the reporting period, the chosen
//! metric and the table from the most recent run. Ranking and chart views are
//! derived from that stored table on demand, so changing the metric never
//! triggers a fetch. Only [`AnalysisSession::run`] talks to the source, and
//! each run replaces the stored table wholesale.

use crate::analysis::{top_ranked, BankResult, Metric, RankedEntry};
use crate::chart::{proportions, ChartError, Slice};
use crate::error::LoanAnalysisError;
use crate::fetch::{fetch_construction_loans, CallReportSource, FetchFailure};
use crate::filter::{Selection, Selector};
use crate::registry::{Bank, BankRegistry};
use crate::snapshot::AnalysisSnapshot;
use crate::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoResults,
    ResultsReady,
}

/// What a run trigger did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing matched the selectors; no request was made and stored results
    /// were left alone.
    NoMatches,
    /// Every filtered bank was processed. `failures` lists the banks that
    /// ended up as error rows.
    Completed {
        rows: usize,
        failures: Vec<FetchFailure>,
    },
}

/// The stored table and the inputs that produced it.
#[derive(Debug, Clone)]
struct StoredRun {
    reporting_period: String,
    selection: Selection,
    results: Vec<BankResult>,
}

pub struct AnalysisSession {
    registry: BankRegistry,
    selection: Selection,
    reporting_period: String,
    metric: Metric,
    last_run: Option<StoredRun>,
}

impl AnalysisSession {
    pub fn new(registry: BankRegistry, reporting_period: impl Into<String>) -> Self {
        Self {
            registry,
            selection: Selection::default(),
            reporting_period: reporting_period.into(),
            metric: Metric::default(),
            last_run: None,
        }
    }

    pub fn registry(&self) -> &BankRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn reporting_period(&self) -> &str {
        &self.reporting_period
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn state(&self) -> SessionState {
        match self.last_run {
            Some(_) => SessionState::ResultsReady,
            None => SessionState::NoResults,
        }
    }

    /// Replaces the whole selection as given. Use the `set_*_filter` methods
    /// for cascading updates.
    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn set_state_filter(&mut self, state: Selector) {
        self.selection.state = state;
        self.selection.reconcile(&self.registry);
    }

    pub fn set_county_filter(&mut self, county: Selector) {
        self.selection.county = county;
        self.selection.reconcile(&self.registry);
    }

    pub fn set_city_filter(&mut self, city: Selector) {
        self.selection.city = city;
        self.selection.reconcile(&self.registry);
    }

    pub fn set_reporting_period(&mut self, period: &str) -> Result<(), LoanAnalysisError> {
        self.reporting_period = validation::validate_reporting_period(period)?;
        Ok(())
    }

    /// Switches the metric used by the ranking and chart views. Stored results
    /// are untouched.
    pub fn set_metric(&mut self, metric: Metric) {
        self.metric = metric;
    }

    pub fn filtered_banks(&self) -> Vec<&Bank> {
        self.selection.apply(&self.registry)
    }

    /// Fetches data for the currently filtered banks and stores the table.
    ///
    /// With an empty selection nothing is fetched and any previous results
    /// stay in place.
    pub async fn run<S, F>(
        &mut self,
        source: &S,
        on_progress: F,
    ) -> Result<RunOutcome, LoanAnalysisError>
    where
        S: CallReportSource,
        F: FnMut(usize),
    {
        let period = validation::validate_reporting_period(&self.reporting_period)?;
        let banks = self.filtered_banks();
        if banks.is_empty() {
            tracing::warn!("No banks match the selected filters ({})", self.selection);
            return Ok(RunOutcome::NoMatches);
        }

        tracing::info!(
            "Fetching call report data for {} banks, period {}",
            banks.len(),
            period
        );
        let report = fetch_construction_loans(source, &banks, &period, on_progress).await;
        tracing::info!(
            "Analysis complete: {} ok, {} failed",
            report.succeeded(),
            report.failures.len()
        );

        let rows = report.results.len();
        self.last_run = Some(StoredRun {
            reporting_period: period,
            selection: self.selection.clone(),
            results: report.results,
        });
        Ok(RunOutcome::Completed {
            rows,
            failures: report.failures,
        })
    }

    /// Table from the last run, in bank order.
    pub fn results(&self) -> Option<&[BankResult]> {
        self.last_run.as_ref().map(|r| r.results.as_slice())
    }

    /// Reporting period the stored table was fetched for.
    pub fn results_period(&self) -> Option<&str> {
        self.last_run.as_ref().map(|r| r.reporting_period.as_str())
    }

    /// Top entries by the current metric.
    pub fn ranking(&self) -> Option<Vec<RankedEntry>> {
        self.results().map(|r| top_ranked(r, self.metric))
    }

    /// Chart slices by the current metric.
    pub fn chart(&self) -> Option<Result<Vec<Slice>, ChartError>> {
        self.results().map(|r| proportions(r, self.metric))
    }

    pub fn snapshot(&self) -> Option<AnalysisSnapshot> {
        self.last_run.as_ref().map(|r| {
            AnalysisSnapshot::new(&r.reporting_period, r.selection.clone(), r.results.clone())
        })
    }

    /// Loads a previously saved table as the stored results.
    pub fn restore(&mut self, snapshot: AnalysisSnapshot) {
        self.last_run = Some(StoredRun {
            reporting_period: snapshot.reporting_period,
            selection: snapshot.selection,
            results: snapshot.results,
        });
    }
}
