//! The `options` subcommand: selector values for cascading filters.

use anyhow::Result;
use bankloans_lib::filter::{city_options, county_options, with_all};
use bankloans_lib::{AppConfig, BankRegistry, Selection};
use clap::Args;

use super::{load_registry, SelectorArgs};
use crate::output::{print_options, OutputFormat, SelectorOptions};

#[derive(Args)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub selectors: SelectorArgs,
}

/// Option lists for each selector given the upstream choices in `selection`.
pub fn selector_options(registry: &BankRegistry, selection: &Selection) -> SelectorOptions {
    SelectorOptions {
        states: with_all(registry.states()),
        counties: with_all(county_options(registry, &selection.state)),
        cities: with_all(city_options(registry, &selection.state, &selection.county)),
    }
}

pub fn run(args: &OptionsArgs, config: &AppConfig, format: &OutputFormat) -> Result<()> {
    let registry = load_registry(config)?;
    let selection = args.selectors.selection()?;
    print_options(&selector_options(&registry, &selection), format)
}
