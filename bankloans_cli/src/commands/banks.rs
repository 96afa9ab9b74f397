//! The `banks` subcommand: list the banks a run would analyze.

use anyhow::Result;
use bankloans_lib::AppConfig;
use clap::Args;

use super::{load_registry, SelectorArgs};
use crate::output::{print_banks, OutputFormat};

#[derive(Args)]
pub struct BanksArgs {
    #[command(flatten)]
    pub selectors: SelectorArgs,
}

pub fn run(args: &BanksArgs, config: &AppConfig, format: &OutputFormat) -> Result<()> {
    let registry = load_registry(config)?;
    let selection = args.selectors.selection()?;
    let banks = selection.apply(&registry);

    if banks.is_empty() {
        eprintln!("No banks match the selected filters ({}).", selection);
    }
    print_banks(&banks, format)
}
