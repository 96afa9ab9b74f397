//! Construction loan figures per bank, one call report request at a time.
//!
//! Banks are processed strictly in order with a single request in flight.
//! A failed request marks only that bank's row and the loop moves on; there
//! is no retry and no backoff.

use async_trait::async_trait;
use callreport_api::{MetricSample, Series};

use crate::analysis::BankResult;
use crate::error::LoanAnalysisError;
use crate::registry::Bank;

/// 1-4 family residential construction loans.
pub const RESIDENTIAL_CONSTRUCTION_MDRM: &str = "RCONF158";
/// Other construction loans and all land development and other land loans.
pub const OTHER_CONSTRUCTION_MDRM: &str = "RCONF159";
/// Call report amounts are reported in thousands of dollars.
pub const REPORTING_UNIT: i64 = 1000;

/// Anything that can return a bank's time series for a reporting period.
#[async_trait]
pub trait CallReportSource: Send + Sync {
    async fn collect_data(
        &self,
        rssd_id: u64,
        reporting_period: &str,
        series: Series,
    ) -> Result<Vec<MetricSample>, LoanAnalysisError>;
}

#[async_trait]
impl CallReportSource for callreport_api::Client {
    async fn collect_data(
        &self,
        rssd_id: u64,
        reporting_period: &str,
        series: Series,
    ) -> Result<Vec<MetricSample>, LoanAnalysisError> {
        Ok(callreport_api::Client::collect_data(self, rssd_id, reporting_period, series).await?)
    }
}

/// The two construction loan fields of one bank, in dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstructionLoans {
    pub residential: i64,
    pub other: i64,
}

impl ConstructionLoans {
    pub fn total(&self) -> i64 {
        self.residential.saturating_add(self.other)
    }
}

fn scaled_value(samples: &[MetricSample], mdrm: &str) -> i64 {
    samples
        .iter()
        .find(|s| s.mdrm == mdrm)
        .and_then(|s| s.int_data)
        .map(|v| v.saturating_mul(REPORTING_UNIT))
        .unwrap_or(0)
}

/// Picks RCONF158 and RCONF159 out of a time series and scales them to dollars.
///
/// A missing code counts as zero. When a code appears more than once the
/// first occurrence wins.
pub fn extract_construction_loans(samples: &[MetricSample]) -> ConstructionLoans {
    ConstructionLoans {
        residential: scaled_value(samples, RESIDENTIAL_CONSTRUCTION_MDRM),
        other: scaled_value(samples, OTHER_CONSTRUCTION_MDRM),
    }
}

/// A bank whose request failed during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub bank_name: String,
    pub rssd_id: u64,
    pub message: String,
}

/// Output of one fetch loop: one row per input bank, in input order.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub results: Vec<BankResult>,
    pub failures: Vec<FetchFailure>,
}

impl FetchReport {
    pub fn succeeded(&self) -> usize {
        self.results.len() - self.failures.len()
    }
}

/// Fetches call report data for every bank, sequentially.
///
/// `on_progress` is called after each bank with the number of banks done.
pub async fn fetch_construction_loans<S, F>(
    source: &S,
    banks: &[&Bank],
    reporting_period: &str,
    mut on_progress: F,
) -> FetchReport
where
    S: CallReportSource,
    F: FnMut(usize),
{
    let mut report = FetchReport {
        results: Vec::with_capacity(banks.len()),
        failures: Vec::new(),
    };

    for (i, bank) in banks.iter().enumerate() {
        match source
            .collect_data(bank.rssd_id, reporting_period, Series::Call)
            .await
        {
            Ok(samples) => {
                let loans = extract_construction_loans(&samples);
                tracing::debug!(
                    "{} (rssd {}): RCONF158={} RCONF159={}",
                    bank.name,
                    bank.rssd_id,
                    loans.residential,
                    loans.other
                );
                report.results.push(BankResult::from_loans(bank, loans));
            }
            Err(e) => {
                tracing::warn!("Error analyzing {} (rssd {}): {}", bank.name, bank.rssd_id, e);
                report.failures.push(FetchFailure {
                    bank_name: bank.name.clone(),
                    rssd_id: bank.rssd_id,
                    message: e.to_string(),
                });
                report.results.push(BankResult::error(bank));
            }
        }
        on_progress(i + 1);
    }

    report
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::analysis::LoanValue;

    /// In-process source keyed by RSSD id. Unknown ids fail like a 500.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub series: HashMap<u64, Vec<MetricSample>>,
        pub calls: Mutex<Vec<(u64, String, Series)>>,
    }

    impl FakeSource {
        pub(crate) fn with(mut self, rssd_id: u64, samples: Vec<MetricSample>) -> Self {
            self.series.insert(rssd_id, samples);
            self
        }
    }

    #[async_trait]
    impl CallReportSource for FakeSource {
        async fn collect_data(
            &self,
            rssd_id: u64,
            reporting_period: &str,
            series: Series,
        ) -> Result<Vec<MetricSample>, LoanAnalysisError> {
            self.calls
                .lock()
                .unwrap()
                .push((rssd_id, reporting_period.to_string(), series));
            self.series.get(&rssd_id).cloned().ok_or_else(|| {
                LoanAnalysisError::Api(callreport_api::Error::HttpStatus {
                    status: 500,
                    body: "boom".to_string(),
                })
            })
        }
    }

    pub(crate) fn bank(id: u64, name: &str) -> Bank {
        Bank {
            rssd_id: id,
            name: name.to_string(),
            city: "Austin".to_string(),
            county: "Travis".to_string(),
            state: "TX".to_string(),
        }
    }

    #[test]
    fn extract_scales_thousands_and_sums() {
        let samples = vec![
            MetricSample::int("RCON2170", 999),
            MetricSample::int("RCONF158", 12),
            MetricSample::int("RCONF159", 8),
        ];
        let loans = extract_construction_loans(&samples);
        assert_eq!(loans.residential, 12_000);
        assert_eq!(loans.other, 8_000);
        assert_eq!(loans.total(), 20_000);
    }

    #[test]
    fn missing_code_is_zero() {
        let samples = vec![MetricSample::int("RCONF159", 8)];
        let loans = extract_construction_loans(&samples);
        assert_eq!(loans.residential, 0);
        assert_eq!(loans.total(), 8_000);
    }

    #[test]
    fn sample_without_int_value_is_zero() {
        let mut sample = MetricSample::int("RCONF158", 0);
        sample.int_data = None;
        let loans = extract_construction_loans(&[sample]);
        assert_eq!(loans.residential, 0);
    }

    #[test]
    fn first_duplicate_wins() {
        let samples = vec![
            MetricSample::int("RCONF158", 1),
            MetricSample::int("RCONF158", 2),
        ];
        assert_eq!(extract_construction_loans(&samples).residential, 1_000);
    }

    #[test]
    fn empty_series_is_all_zero() {
        assert_eq!(extract_construction_loans(&[]), ConstructionLoans::default());
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_batch() {
        let source = FakeSource::default()
            .with(1, vec![MetricSample::int("RCONF158", 12), MetricSample::int("RCONF159", 8)])
            .with(3, vec![MetricSample::int("RCONF159", 5)]);
        let a = bank(1, "Alpha");
        let b = bank(2, "Bravo");
        let c = bank(3, "Charlie");
        let banks = vec![&a, &b, &c];

        let mut progress = Vec::new();
        let report =
            fetch_construction_loans(&source, &banks, "6/30/2024", |n| progress.push(n)).await;

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[0].total, LoanValue::Amount(20_000));
        assert!(report.results[1].is_error());
        assert_eq!(report.results[1].residential, LoanValue::Error);
        assert_eq!(report.results[1].other, LoanValue::Error);
        assert_eq!(report.results[2].residential, LoanValue::Amount(0));
        assert_eq!(report.results[2].total, LoanValue::Amount(5_000));

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].bank_name, "Bravo");
        assert!(report.failures[0].message.contains("500"));
        assert_eq!(report.succeeded(), 2);
        assert_eq!(progress, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn requests_are_issued_in_bank_order_with_call_series() {
        let source = FakeSource::default().with(7, vec![]).with(9, vec![]);
        let x = bank(9, "Nine");
        let y = bank(7, "Seven");
        let banks = vec![&x, &y];
        fetch_construction_loans(&source, &banks, "3/31/2024", |_| {}).await;

        let calls = source.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                (9, "3/31/2024".to_string(), Series::Call),
                (7, "3/31/2024".to_string(), Series::Call),
            ]
        );
    }
}
