//! CLI subcommand implementations.

pub mod analyze;
pub mod banks;
pub mod interactive;
pub mod options;
pub mod rank;

use anyhow::Result;
use bankloans_lib::validation;
use bankloans_lib::{AppConfig, BankRegistry, Selection};
use clap::Args;

/// The three cascading selectors, shared by every command that filters banks.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectorArgs {
    /// State to filter by, or "All"
    #[arg(long)]
    pub state: Option<String>,

    /// County to filter by, or "All"
    #[arg(long)]
    pub county: Option<String>,

    /// City to filter by, or "All"
    #[arg(long)]
    pub city: Option<String>,
}

impl SelectorArgs {
    pub fn selection(&self) -> Result<Selection> {
        Ok(Selection::new(
            validation::validate_selector(self.state.as_deref())?,
            validation::validate_selector(self.county.as_deref())?,
            validation::validate_selector(self.city.as_deref())?,
        ))
    }
}

pub fn load_registry(config: &AppConfig) -> Result<BankRegistry> {
    Ok(BankRegistry::from_path(&config.banks_csv)?)
}
