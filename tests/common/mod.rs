//! Shared helpers for suitecase integration tests.
#![allow(dead_code)]

use suitecase::config::{ColorMode, RunConfig};
use suitecase::runner::{Outcome, RunReport, Runner};
use suitecase::suite::Suite;

/// Runs `suite` with colors off and no filter.
pub fn run<F: Default>(suite: &Suite<F>) -> RunReport {
    run_with(suite, RunConfig::default().with_color(ColorMode::Never))
}

pub fn run_with<F: Default>(suite: &Suite<F>, config: RunConfig) -> RunReport {
    Runner::new(&config).run(suite)
}

/// `(qualified name, label)` for every result, in order.
pub fn labels(report: &RunReport) -> Vec<(String, &'static str)> {
    report
        .results
        .iter()
        .map(|r| (r.qualified_name(), r.outcome.label()))
        .collect()
}

pub fn outcome_of<'r>(report: &'r RunReport, name: &str) -> &'r Outcome {
    &report
        .results
        .iter()
        .find(|r| r.name() == name)
        .unwrap_or_else(|| panic!("no result named {name}"))
        .outcome
}
