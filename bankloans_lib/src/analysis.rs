//! Per-bank results, metric selection and top-N ranking.
//!
//! Nothing here performs network calls: ranking always works on an already
//! fetched result table, so switching the ranked metric never re-fetches.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::fetch::ConstructionLoans;
use crate::registry::Bank;

/// Number of entries kept by [`top_ranked`].
pub const TOP_N: usize = 10;

/// Marker written in place of amounts when a bank's fetch failed.
pub const ERROR_MARKER: &str = "Error";

/// A dollar amount, or the error marker for a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanValue {
    Amount(i64),
    Error,
}

impl LoanValue {
    pub fn amount(&self) -> Option<i64> {
        match self {
            LoanValue::Amount(v) => Some(*v),
            LoanValue::Error => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoanValue::Error)
    }
}

impl fmt::Display for LoanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanValue::Amount(v) => write!(f, "{}", v),
            LoanValue::Error => f.write_str(ERROR_MARKER),
        }
    }
}

impl Serialize for LoanValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LoanValue::Amount(v) => serializer.serialize_i64(*v),
            LoanValue::Error => serializer.serialize_str(ERROR_MARKER),
        }
    }
}

struct LoanValueVisitor;

impl<'de> Visitor<'de> for LoanValueVisitor {
    type Value = LoanValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "an integer amount or \"{}\"", ERROR_MARKER)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LoanValue, E> {
        Ok(LoanValue::Amount(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LoanValue, E> {
        i64::try_from(v)
            .map(LoanValue::Amount)
            .map_err(|_| E::custom(format!("amount {} out of range", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LoanValue, E> {
        if v == ERROR_MARKER {
            return Ok(LoanValue::Error);
        }
        v.parse::<i64>()
            .map(LoanValue::Amount)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for LoanValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LoanValueVisitor)
    }
}

/// One row of the analysis table. Field names double as the export headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankResult {
    #[serde(rename = "Bank Name")]
    pub bank_name: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "County")]
    pub county: String,
    #[serde(rename = "1-4 Family Residential Construction Loans (RCONF158)")]
    pub residential: LoanValue,
    #[serde(rename = "Other Construction and Land Development Loans (RCONF159)")]
    pub other: LoanValue,
    #[serde(rename = "Total Construction Loans")]
    pub total: LoanValue,
}

impl BankResult {
    pub fn from_loans(bank: &Bank, loans: ConstructionLoans) -> Self {
        Self {
            bank_name: bank.name.clone(),
            city: bank.city.clone(),
            state: bank.state.clone(),
            county: bank.county.clone(),
            residential: LoanValue::Amount(loans.residential),
            other: LoanValue::Amount(loans.other),
            total: LoanValue::Amount(loans.total()),
        }
    }

    /// Placeholder row for a bank whose fetch failed.
    pub fn error(bank: &Bank) -> Self {
        Self {
            bank_name: bank.name.clone(),
            city: bank.city.clone(),
            state: bank.state.clone(),
            county: bank.county.clone(),
            residential: LoanValue::Error,
            other: LoanValue::Error,
            total: LoanValue::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.total.is_error()
    }

    pub fn metric(&self, metric: Metric) -> LoanValue {
        match metric {
            Metric::Residential => self.residential,
            Metric::Other => self.other,
            Metric::Total => self.total,
        }
    }
}

/// The numeric columns a user can rank or chart by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// RCONF158, 1-4 family residential construction loans.
    Residential,
    /// RCONF159, other construction and land development loans.
    Other,
    #[default]
    Total,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Residential, Metric::Other, Metric::Total];

    /// Column header for this metric.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Residential => "1-4 Family Residential Construction Loans (RCONF158)",
            Metric::Other => "Other Construction and Land Development Loans (RCONF159)",
            Metric::Total => "Total Construction Loans",
        }
    }

    /// Short name accepted on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Residential => "rconf158",
            Metric::Other => "rconf159",
            Metric::Total => "total",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "rconf158" | "residential" | "f158" => Ok(Metric::Residential),
            "rconf159" | "other" | "f159" => Ok(Metric::Other),
            "total" => Ok(Metric::Total),
            _ => Metric::ALL
                .into_iter()
                .find(|m| m.label().to_lowercase() == lower)
                .ok_or_else(|| RankingError::UnknownMetric(s.to_string())),
        }
    }
}

/// Errors surfaced by the ranking view.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RankingError {
    #[error("unknown metric '{0}'. Valid values: rconf158 (residential), rconf159 (other), total")]
    UnknownMetric(String),
}

/// One line of the top-N list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub bank_name: String,
    pub value: i64,
}

/// Top [`TOP_N`] banks by `metric`, highest first.
///
/// Error rows are skipped. The sort is stable, so equal values keep their
/// table order.
pub fn top_ranked(results: &[BankResult], metric: Metric) -> Vec<RankedEntry> {
    let mut valid: Vec<(&BankResult, i64)> = results
        .iter()
        .filter_map(|r| r.metric(metric).amount().map(|v| (r, v)))
        .collect();
    valid.sort_by(|a, b| b.1.cmp(&a.1));
    valid
        .into_iter()
        .take(TOP_N)
        .enumerate()
        .map(|(i, (r, value))| RankedEntry {
            rank: i + 1,
            bank_name: r.bank_name.clone(),
            value,
        })
        .collect()
}

/// Parses `metric_name` and ranks by it.
pub fn rank_by(results: &[BankResult], metric_name: &str) -> Result<Vec<RankedEntry>, RankingError> {
    let metric: Metric = metric_name.parse()?;
    Ok(top_ranked(results, metric))
}

/// Sum of `metric` over rows with numeric values.
pub fn metric_total(results: &[BankResult], metric: Metric) -> i64 {
    results
        .iter()
        .filter_map(|r| r.metric(metric).amount())
        .fold(0i64, i64::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, total: LoanValue) -> BankResult {
        BankResult {
            bank_name: name.to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            county: "Travis".to_string(),
            residential: total,
            other: match total {
                LoanValue::Amount(_) => LoanValue::Amount(0),
                LoanValue::Error => LoanValue::Error,
            },
            total,
        }
    }

    #[test]
    fn ranking_skips_errors_and_keeps_tie_order() {
        let results = vec![
            row("A", LoanValue::Amount(50_000)),
            row("B", LoanValue::Error),
            row("C", LoanValue::Amount(30_000)),
            row("D", LoanValue::Amount(50_000)),
        ];
        let top = top_ranked(&results, Metric::Total);
        let names: Vec<&str> = top.iter().map(|e| e.bank_name.as_str()).collect();
        assert_eq!(names, vec!["A", "D", "C"]);
        let ranks: Vec<usize> = top.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(top[0].value, 50_000);
        assert_eq!(top[2].value, 30_000);
    }

    #[test]
    fn ranking_takes_at_most_ten() {
        let results: Vec<BankResult> = (0..15)
            .map(|i| row(&format!("Bank {i}"), LoanValue::Amount(i * 1000)))
            .collect();
        let top = top_ranked(&results, Metric::Total);
        assert_eq!(top.len(), TOP_N);
        assert_eq!(top[0].bank_name, "Bank 14");
        assert_eq!(top[9].bank_name, "Bank 5");
        assert_eq!(top[9].rank, 10);
    }

    #[test]
    fn ranking_all_errors_is_empty() {
        let results = vec![row("A", LoanValue::Error), row("B", LoanValue::Error)];
        assert!(top_ranked(&results, Metric::Total).is_empty());
    }

    #[test]
    fn reranking_by_other_metric_leaves_rows_untouched() {
        let mut a = row("A", LoanValue::Amount(10_000));
        a.residential = LoanValue::Amount(1_000);
        a.other = LoanValue::Amount(9_000);
        let mut b = row("B", LoanValue::Amount(8_000));
        b.residential = LoanValue::Amount(8_000);
        b.other = LoanValue::Amount(0);
        let results = vec![a, b];
        let before = results.clone();

        let by_total = top_ranked(&results, Metric::Total);
        let by_residential = top_ranked(&results, Metric::Residential);
        assert_eq!(by_total[0].bank_name, "A");
        assert_eq!(by_residential[0].bank_name, "B");
        assert_eq!(by_residential[0].value, 8_000);
        assert_eq!(results, before);
    }

    #[test]
    fn rank_by_rejects_unknown_metric() {
        let err = rank_by(&[], "deposits").unwrap_err();
        assert_eq!(err, RankingError::UnknownMetric("deposits".to_string()));
        assert!(err.to_string().contains("deposits"));
    }

    #[test]
    fn metric_parsing_accepts_codes_aliases_and_labels() {
        assert_eq!("RCONF158".parse::<Metric>().unwrap(), Metric::Residential);
        assert_eq!("residential".parse::<Metric>().unwrap(), Metric::Residential);
        assert_eq!("rconf159".parse::<Metric>().unwrap(), Metric::Other);
        assert_eq!(" Total ".parse::<Metric>().unwrap(), Metric::Total);
        assert_eq!(
            "Total Construction Loans".parse::<Metric>().unwrap(),
            Metric::Total
        );
    }

    #[test]
    fn loan_value_display() {
        assert_eq!(LoanValue::Amount(20_000).to_string(), "20000");
        assert_eq!(LoanValue::Error.to_string(), "Error");
    }

    #[test]
    fn loan_value_json_representation() {
        assert_eq!(serde_json::to_string(&LoanValue::Amount(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&LoanValue::Error).unwrap(), "\"Error\"");
        assert_eq!(
            serde_json::from_str::<LoanValue>("\"Error\"").unwrap(),
            LoanValue::Error
        );
        assert_eq!(
            serde_json::from_str::<LoanValue>("-3").unwrap(),
            LoanValue::Amount(-3)
        );
        assert!(serde_json::from_str::<LoanValue>("\"n/a\"").is_err());
    }

    #[test]
    fn metric_total_ignores_errors() {
        let results = vec![
            row("A", LoanValue::Amount(1_000)),
            row("B", LoanValue::Error),
            row("C", LoanValue::Amount(2_500)),
        ];
        assert_eq!(metric_total(&results, Metric::Total), 3_500);
    }

    #[test]
    fn metric_total_saturates() {
        let results = vec![
            row("A", LoanValue::Amount(i64::MAX)),
            row("B", LoanValue::Amount(1_000)),
        ];
        assert_eq!(metric_total(&results, Metric::Total), i64::MAX);
    }
}
