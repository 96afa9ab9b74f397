//! On-disk copy of the most recent analysis run.
//!
//! Lets a later invocation re-rank or re-chart the stored table without
//! fetching anything.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::BankResult;
use crate::error::LoanAnalysisError;
use crate::filter::Selection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub generated_at: DateTime<Utc>,
    pub reporting_period: String,
    pub selection: Selection,
    pub results: Vec<BankResult>,
}

impl AnalysisSnapshot {
    pub fn new(reporting_period: &str, selection: Selection, results: Vec<BankResult>) -> Self {
        Self {
            generated_at: Utc::now(),
            reporting_period: reporting_period.to_string(),
            selection,
            results,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), LoanAnalysisError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        tracing::info!("Saved {} results to {}", self.results.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, LoanAnalysisError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
