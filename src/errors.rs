//! Suitecase error taxonomy.
//!
//! Three kinds of failure exist and each has a different blast radius:
//!
//! - [`AssertionFailure`]: an assertion saw a mismatch. Isolated to its case.
//! - [`RuntimeError`]: a case or hook raised. Isolated to its case.
//! - [`RegistrationError`]: the suite tree could not be built. Fatal, the run
//!   never starts.
//!
//! Case bodies and hooks return [`CaseResult`], so both recoverable kinds
//! propagate with `?` up to the runner, which turns them into outcomes.

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Serialize;
use thiserror::Error;

use crate::value::Value;

// ============================================================================
// CASE-LEVEL ERRORS
// ============================================================================

/// Structured mismatch reported by an assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{message}")]
pub struct AssertionFailure {
    pub message: String,
    /// Name of the assertion that failed, e.g. `deep_equal`.
    pub operator: &'static str,
    pub actual: Value,
    pub expected: Value,
}

impl AssertionFailure {
    pub fn new(
        operator: &'static str,
        message: impl Into<String>,
        actual: Value,
        expected: Value,
    ) -> Self {
        Self {
            message: message.into(),
            operator,
            actual,
            expected,
        }
    }
}

/// An error raised inside a case or hook that is not an assertion mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuntimeError {
    message: String,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Everything a case body or hook can return.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaseError {
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl CaseError {
    /// Shorthand for raising a [`RuntimeError`] from a body.
    pub fn raise(message: impl Into<String>) -> Self {
        CaseError::Runtime(RuntimeError::new(message))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CaseError::Assertion(_) => "AssertionFailure",
            CaseError::Runtime(_) => "RuntimeError",
        }
    }
}

pub type CaseResult = Result<(), CaseError>;

// ============================================================================
// REGISTRATION ERRORS
// ============================================================================

/// Structural misuse of the registry; aborts the run before execution.
#[derive(Debug, Error, Diagnostic)]
pub enum RegistrationError {
    #[error("{kind} name must not be empty (inside `{parent}`)")]
    #[diagnostic(
        code(suitecase::registration::empty_name),
        help("give every describe and it block a name")
    )]
    EmptyName { kind: &'static str, parent: String },

    #[error("could not read suite file {path}")]
    #[diagnostic(code(suitecase::registration::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed suite file: {message}")]
    #[diagnostic(code(suitecase::registration::parse))]
    Parse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("invalid step `{step}` in `{case}`: {reason}")]
    #[diagnostic(code(suitecase::registration::step))]
    InvalidStep {
        step: String,
        case: String,
        reason: String,
    },

    #[error("invalid reference `{reference}`: {reason}")]
    #[diagnostic(
        code(suitecase::registration::reference),
        help("references look like `$name`, `$name.field` or `$name[0]`; write `$$` for a literal dollar sign")
    )]
    InvalidReference { reference: String, reason: String },

    #[error("invalid expression `{expression}`: {reason}")]
    #[diagnostic(code(suitecase::registration::expression))]
    InvalidExpression { expression: String, reason: String },

    #[error("`{suite}` raised while registering: {source}")]
    #[diagnostic(code(suitecase::registration::body))]
    Body {
        suite: String,
        #[source]
        source: RuntimeError,
    },

    #[error("no suite files found under {0}")]
    #[diagnostic(
        code(suitecase::registration::no_suites),
        help("suite files end in .yaml or .yml")
    )]
    NoSuiteFiles(String),
}

impl RegistrationError {
    /// Builds a parse error pointing into `content` at `offset` when known.
    pub fn parse(
        file: &str,
        content: &str,
        message: impl Into<String>,
        offset: Option<usize>,
    ) -> Self {
        RegistrationError::Parse {
            message: message.into(),
            src: NamedSource::new(file, content.to_string()),
            span: offset.map(|at| SourceSpan::from((at.min(content.len()), 0))),
        }
    }
}
