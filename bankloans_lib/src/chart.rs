//! Proportion data for the per-bank distribution chart.

use serde::Serialize;
use thiserror::Error;

use crate::analysis::{BankResult, Metric};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChartError {
    #[error("no results to chart")]
    Empty,
    #[error("column '{metric}' mixes numbers with error markers (first at '{bank}')")]
    NonNumeric { metric: String, bank: String },
}

/// One wedge of the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: i64,
    /// Fraction of the column total, 0.0 to 1.0. Zero when the total is zero.
    pub share: f64,
}

/// Splits `metric` across banks, in table order.
///
/// Every row must carry a number in the chosen column; an error marker
/// anywhere fails the whole chart.
pub fn proportions(results: &[BankResult], metric: Metric) -> Result<Vec<Slice>, ChartError> {
    if results.is_empty() {
        return Err(ChartError::Empty);
    }

    let mut values = Vec::with_capacity(results.len());
    for r in results {
        match r.metric(metric).amount() {
            Some(v) => values.push((r.bank_name.clone(), v)),
            None => {
                return Err(ChartError::NonNumeric {
                    metric: metric.label().to_string(),
                    bank: r.bank_name.clone(),
                })
            }
        }
    }

    let total = values.iter().map(|(_, v)| *v).fold(0i64, i64::saturating_add);
    Ok(values
        .into_iter()
        .map(|(label, value)| Slice {
            share: if total == 0 {
                0.0
            } else {
                value as f64 / total as f64
            },
            label,
            value,
        })
        .collect())
}
