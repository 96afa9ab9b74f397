//! Static bank reference table.
//!
//! Loaded once at startup from a CSV file with (at least) the columns
//! `rssd_id`, `name`, `city`, `county` and `state`. Extra columns are ignored
//! and column order is free. A missing required column or an unparseable row
//! fails the whole load.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Columns every reference file must carry.
pub const REQUIRED_COLUMNS: &[&str] = &["rssd_id", "name", "city", "county", "state"];

/// Errors from loading the reference table.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to open bank list {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Bank list is missing required column '{0}'")]
    MissingColumn(String),
    #[error("Malformed bank list: {0}")]
    Csv(#[from] csv::Error),
}

/// One institution from the reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    /// Federal Reserve RSSD identifier, used as the lookup key for call reports.
    pub rssd_id: u64,
    pub name: String,
    pub city: String,
    pub county: String,
    pub state: String,
}

/// Read-only, order-preserving list of banks.
#[derive(Debug, Clone, Default)]
pub struct BankRegistry {
    banks: Vec<Bank>,
}

impl BankRegistry {
    pub fn from_banks(banks: Vec<Bank>) -> Self {
        Self { banks }
    }

    /// Loads the registry from a CSV file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RegistryError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let registry = Self::from_reader(file)?;
        tracing::info!(
            "Loaded {} banks from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Loads the registry from any CSV source with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RegistryError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == *column) {
                return Err(RegistryError::MissingColumn(column.to_string()));
            }
        }

        let banks = rdr
            .deserialize::<Bank>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { banks })
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }

    /// Distinct states, sorted.
    pub fn states(&self) -> Vec<String> {
        self.banks
            .iter()
            .map(|b| b.state.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
rssd_id,name,city,county,state
480228,First Prairie Bank,Austin,Travis,TX
12311,Hill Country Savings,Dallas,Dallas,TX
99,Bayou Trust,Baton Rouge,East Baton Rouge,LA
";

    #[test]
    fn load_preserves_order() {
        let registry = BankRegistry::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(registry.len(), 3);
        let names: Vec<&str> = registry.banks().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["First Prairie Bank", "Hill Country Savings", "Bayou Trust"]
        );
        assert_eq!(registry.banks()[0].rssd_id, 480228);
    }

    #[test]
    fn extra_columns_and_reordering_allowed() {
        let csv = "state,name,charter,rssd_id,county,city\nTX,Lone Star Bank,NAT,7,Travis,Austin\n";
        let registry = BankRegistry::from_reader(csv.as_bytes()).unwrap();
        let bank = &registry.banks()[0];
        assert_eq!(bank.name, "Lone Star Bank");
        assert_eq!(bank.city, "Austin");
        assert_eq!(bank.county, "Travis");
        assert_eq!(bank.rssd_id, 7);
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "rssd_id,name,city,state\n1,A,Austin,TX\n";
        let err = BankRegistry::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            RegistryError::MissingColumn(col) => assert_eq!(col, "county"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn non_numeric_identifier_is_fatal() {
        let csv = "rssd_id,name,city,county,state\nabc,A,Austin,Travis,TX\n";
        let err = BankRegistry::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, RegistryError::Csv(_)));
    }

    #[test]
    fn header_whitespace_trimmed() {
        let csv = "rssd_id, name ,city,county,state\n1,A,Austin,Travis,TX\n";
        let registry = BankRegistry::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(registry.banks()[0].name, "A");
    }

    #[test]
    fn header_only_file_is_empty_registry() {
        let csv = "rssd_id,name,city,county,state\n";
        let registry = BankRegistry::from_reader(csv.as_bytes()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = BankRegistry::from_path("/definitely/not/here/banks.csv").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here/banks.csv"));
    }

    #[test]
    fn states_are_sorted_and_distinct() {
        let registry = BankRegistry::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(registry.states(), vec!["LA".to_string(), "TX".to_string()]);
    }
}
