//! Runner: walks a suite tree and produces one [`TestResult`] per case.
//!
//! Cases run depth-first in declaration order. Each runnable case gets a
//! fresh fixture (`F::default()`), every applicable hook from the root down
//! to the case's own suite, and then its body. Whatever happens inside a case
//! stays inside its result; panics are caught here, once.

use serde::{Serialize, Serializer};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::assert::panic_message;
use crate::config::RunConfig;
use crate::errors::{AssertionFailure, CaseError, CaseResult};
use crate::suite::{Case, Entry, Hook, Mode, Suite};

// =============================================================================
// CORE TYPES
// =============================================================================

/// Where an errored case raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Hook,
    Body,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    /// An assertion reported a mismatch.
    Failed { failure: AssertionFailure },
    /// A hook or the body raised, or panicked.
    Errored { phase: Phase, detail: String },
    Skipped { reason: String },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASS",
            Outcome::Failed { .. } => "FAIL",
            Outcome::Errored { .. } => "ERROR",
            Outcome::Skipped { .. } => "SKIP",
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    /// Failed or errored; skipped cases do not count.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. } | Outcome::Errored { .. })
    }
}

/// Represents the result of executing a single case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    /// Suite names from the outermost named suite down to the case name.
    pub path: Vec<String>,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(rename = "duration_ms", serialize_with = "millis")]
    pub duration: Duration,
}

impl TestResult {
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    pub fn qualified_name(&self) -> String {
        self.path.join(" > ")
    }
}

fn millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn has_failures(&self) -> bool {
        self.failed + self.errored > 0
    }

    /// Percentage of executed (non-skipped) cases that passed.
    pub fn success_rate(&self) -> f64 {
        let executed = self.total - self.skipped;
        if executed == 0 {
            return 0.0;
        }
        (self.passed as f64 / executed as f64) * 100.0
    }
}

/// Ordered results of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub results: Vec<TestResult>,
}

impl RunReport {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            total: self.results.len(),
            ..Summary::default()
        };
        for result in &self.results {
            match result.outcome {
                Outcome::Passed => summary.passed += 1,
                Outcome::Failed { .. } => summary.failed += 1,
                Outcome::Errored { .. } => summary.errored += 1,
                Outcome::Skipped { .. } => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn is_success(&self) -> bool {
        !self.summary().has_failures()
    }

    /// 0 when nothing failed or errored, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

// =============================================================================
// EXECUTION
// =============================================================================

pub struct Runner<'a> {
    config: &'a RunConfig,
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    pub fn run<F: Default>(&self, suite: &Suite<F>) -> RunReport {
        let mut walk = Walk {
            focus: suite.has_only(),
            filter: self
                .config
                .filter
                .as_deref()
                .map(|given| (given.to_string(), given.to_lowercase())),
            hooks: Vec::new(),
            path: Vec::new(),
            results: Vec::with_capacity(suite.case_count()),
        };
        walk.visit_suite(suite, Inherited::default());

        let report = RunReport {
            results: walk.results,
        };
        let summary = report.summary();
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            errored = summary.errored,
            skipped = summary.skipped,
            "run finished"
        );
        report
    }
}

/// Modes accumulated from the ancestors of a node.
#[derive(Debug, Clone, Copy, Default)]
struct Inherited {
    skipped: bool,
    focused: bool,
}

impl Inherited {
    fn enter(self, mode: Mode) -> Self {
        Self {
            skipped: self.skipped || mode == Mode::Skip,
            focused: self.focused || mode == Mode::Only,
        }
    }
}

struct Walk<'s, F> {
    focus: bool,
    /// The filter as given, and lowercased for matching.
    filter: Option<(String, String)>,
    hooks: Vec<&'s Hook<F>>,
    path: Vec<String>,
    results: Vec<TestResult>,
}

impl<'s, F: Default> Walk<'s, F> {
    fn visit_suite(&mut self, suite: &'s Suite<F>, inherited: Inherited) {
        let named = !suite.name().is_empty();
        if named {
            self.path.push(suite.name().to_string());
        }
        let inherited = inherited.enter(suite.mode());
        let depth = self.hooks.len();
        self.hooks.extend(suite.hooks().iter());

        for entry in suite.entries() {
            match entry {
                Entry::Case(case) => {
                    let result = self.run_case(case, inherited);
                    self.results.push(result);
                }
                Entry::Suite(child) => self.visit_suite(child, inherited),
            }
        }

        self.hooks.truncate(depth);
        if named {
            self.path.pop();
        }
    }

    fn skip_reason(&self, inherited: Inherited, qualified: &str) -> Option<String> {
        if self.focus && !inherited.focused {
            return Some("Not marked 'only' in 'only' mode".to_string());
        }
        if inherited.skipped {
            return Some("Marked 'skip'".to_string());
        }
        if let Some((given, needle)) = &self.filter {
            if !qualified.to_lowercase().contains(needle.as_str()) {
                return Some(format!("Filtered out by substring: {}", given));
            }
        }
        None
    }

    fn run_case(&self, case: &Case<F>, inherited: Inherited) -> TestResult {
        let mut path = self.path.clone();
        path.push(case.name().to_string());
        let qualified = path.join(" > ");

        if let Some(reason) = self.skip_reason(inherited.enter(case.mode()), &qualified) {
            debug!(case = %qualified, %reason, "skipping case");
            return TestResult {
                path,
                outcome: Outcome::Skipped { reason },
                duration: Duration::ZERO,
            };
        }

        debug!(case = %qualified, hooks = self.hooks.len(), "running case");
        let started = Instant::now();
        let phase = Cell::new(Phase::Hook);
        let hooks = &self.hooks;
        let caught = panic::catch_unwind(AssertUnwindSafe(|| -> CaseResult {
            let mut fixture = F::default();
            for (index, hook) in hooks.iter().enumerate() {
                trace!(case = %qualified, hook = index, "running before_each hook");
                hook(&mut fixture)?;
            }
            phase.set(Phase::Body);
            case.run(&mut fixture)
        }));

        let outcome = match caught {
            Ok(Ok(())) => Outcome::Passed,
            Ok(Err(err)) if phase.get() == Phase::Hook => Outcome::Errored {
                phase: Phase::Hook,
                detail: err.to_string(),
            },
            Ok(Err(CaseError::Assertion(failure))) => Outcome::Failed { failure },
            Ok(Err(CaseError::Runtime(err))) => Outcome::Errored {
                phase: Phase::Body,
                detail: err.to_string(),
            },
            Err(payload) => Outcome::Errored {
                phase: phase.get(),
                detail: format!("panicked: {}", panic_message(payload.as_ref())),
            },
        };
        debug!(case = %qualified, outcome = outcome.label(), "case finished");

        TestResult {
            path,
            outcome,
            duration: started.elapsed(),
        }
    }
}
