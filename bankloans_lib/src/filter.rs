//! State/county/city selection over the bank registry.
//!
//! Each selector is either a concrete value or the `All` wildcard. The three
//! constraints are ANDed and a wildcard always matches. The option helpers
//! return the sorted distinct values that make sense for the dependent
//! selectors given the current upstream choices.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::registry::{Bank, BankRegistry};

/// Label shown for the wildcard option.
pub const ALL: &str = "All";

/// A single selector value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Selector {
    #[default]
    All,
    Value(String),
}

impl Selector {
    pub fn value(v: impl Into<String>) -> Self {
        Selector::from(v.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selector::All)
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Selector::All => true,
            Selector::Value(v) => v == candidate,
        }
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        if s.trim().eq_ignore_ascii_case(ALL) {
            Selector::All
        } else {
            Selector::Value(s)
        }
    }
}

impl From<Selector> for String {
    fn from(s: Selector) -> Self {
        s.to_string()
    }
}

impl FromStr for Selector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Selector::from(s.to_string()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => f.write_str(ALL),
            Selector::Value(v) => f.write_str(v),
        }
    }
}

/// The three cascading selectors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub state: Selector,
    pub county: Selector,
    pub city: Selector,
}

impl Selection {
    pub fn new(state: Selector, county: Selector, city: Selector) -> Self {
        Self {
            state,
            county,
            city,
        }
    }

    pub fn matches(&self, bank: &Bank) -> bool {
        self.state.matches(&bank.state)
            && self.county.matches(&bank.county)
            && self.city.matches(&bank.city)
    }

    /// Banks satisfying all three selectors, in registry order.
    pub fn apply<'a>(&self, registry: &'a BankRegistry) -> Vec<&'a Bank> {
        registry.banks().iter().filter(|b| self.matches(b)).collect()
    }

    /// Counties offered for the current state choice.
    pub fn county_options(&self, registry: &BankRegistry) -> Vec<String> {
        county_options(registry, &self.state)
    }

    /// Cities offered for the current state and county choices.
    pub fn city_options(&self, registry: &BankRegistry) -> Vec<String> {
        city_options(registry, &self.state, &self.county)
    }

    /// Resets county and city to `All` when they are no longer offered under
    /// the upstream choices. Returns true if anything changed.
    pub fn reconcile(&mut self, registry: &BankRegistry) -> bool {
        let mut changed = false;
        if let Selector::Value(county) = &self.county {
            if !self.county_options(registry).contains(county) {
                self.county = Selector::All;
                changed = true;
            }
        }
        if let Selector::Value(city) = &self.city {
            if !self.city_options(registry).contains(city) {
                self.city = Selector::All;
                changed = true;
            }
        }
        changed
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state={}, county={}, city={}",
            self.state, self.county, self.city
        )
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct counties among banks in `state`, or every county when `state` is `All`.
pub fn county_options(registry: &BankRegistry, state: &Selector) -> Vec<String> {
    distinct_sorted(
        registry
            .banks()
            .iter()
            .filter(|b| state.matches(&b.state))
            .map(|b| b.county.as_str()),
    )
}

/// Distinct cities for the state/county choice.
///
/// Both concrete: cities in that state and county. State concrete, county
/// `All`: cities in the state. State `All`: every city, whatever the county.
pub fn city_options(registry: &BankRegistry, state: &Selector, county: &Selector) -> Vec<String> {
    let county = if state.is_all() { &Selector::All } else { county };
    distinct_sorted(
        registry
            .banks()
            .iter()
            .filter(|b| state.matches(&b.state) && county.matches(&b.county))
            .map(|b| b.city.as_str()),
    )
}

/// Prepends the wildcard label to a list of selector values.
pub fn with_all(values: Vec<String>) -> Vec<String> {
    std::iter::once(ALL.to_string()).chain(values).collect()
}
