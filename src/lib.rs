//! Suitecase: a describe/it test harness.
//!
//! Suites are declared either in Rust, through [`suite::Suite::build`], or in
//! YAML suite files loaded by [`script`]. The [`runner`] executes the tree in
//! declaration order, isolating every case, and the [`report`] module renders
//! the results.

pub use crate::errors::{AssertionFailure, CaseError, CaseResult, RegistrationError, RuntimeError};
pub use crate::runner::{Outcome, RunReport, Runner, Summary, TestResult};
pub use crate::suite::{Suite, SuiteBuilder};
pub use crate::value::Value;

pub mod assert;
pub mod cli;
pub mod config;
pub mod errors;
pub mod report;
pub mod runner;
pub mod script;
pub mod suite;
pub mod value;
