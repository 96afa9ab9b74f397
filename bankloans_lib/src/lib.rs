//! Library layer for the construction loan analyzer: bank registry, selector
//! filtering, call report fetching, aggregation, ranking and export.
//!
//! Wraps the `callreport_api` crate behind the [`CallReportSource`] trait so
//! the pipeline can run against the live service or an in-process fake.

pub mod analysis;
pub mod chart;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod filter;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod validation;

pub use callreport_api;
pub use callreport_api::{Credentials, MetricSample, Series};

pub use analysis::{top_ranked, BankResult, LoanValue, Metric, RankedEntry, RankingError, TOP_N};
pub use chart::{proportions, ChartError, Slice};
pub use config::{AppConfig, ConfigError};
pub use error::LoanAnalysisError;
pub use fetch::{
    extract_construction_loans, fetch_construction_loans, CallReportSource, ConstructionLoans,
    FetchFailure, FetchReport,
};
pub use filter::{Selection, Selector};
pub use registry::{Bank, BankRegistry, RegistryError};
pub use session::{AnalysisSession, RunOutcome, SessionState};
pub use snapshot::AnalysisSnapshot;
