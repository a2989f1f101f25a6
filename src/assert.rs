//! Assertion library.
//!
//! Every assertion returns [`AssertResult`], so case bodies chain them with
//! `?` and the first mismatch ends the case as `Failed`. Inputs are anything
//! convertible into a [`Value`].
//!
//! ```rust
//! use suitecase::assert;
//! use suitecase::value::Value;
//!
//! assert::equal(1, 1).unwrap();
//! assert!(assert::equal(1, "1").is_err());
//! assert::deep_equal(
//!     Value::map([("a", Value::from(1)), ("b", Value::list([1, 2]))]),
//!     Value::map([("a", Value::from(1)), ("b", Value::list([1, 2]))]),
//! )
//! .unwrap();
//! ```

use regex::Regex;
use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

pub use crate::errors::AssertionFailure;
use crate::value::Value;

pub type AssertResult = Result<(), AssertionFailure>;

// ============================================================================
// EQUALITY
// ============================================================================

/// Strict equality without coercion; lists and maps compare by identity.
pub fn equal(actual: impl Into<Value>, expected: impl Into<Value>) -> AssertResult {
    compare("equal", "to equal", actual.into(), expected.into(), |a, e| {
        a.strict_eq(e)
    })
}

pub fn not_equal(actual: impl Into<Value>, expected: impl Into<Value>) -> AssertResult {
    compare("not_equal", "to not equal", actual.into(), expected.into(), |a, e| {
        !a.strict_eq(e)
    })
}

/// Identity/primitive equality. Same relation as [`equal`], reported under
/// its own operator.
pub fn strict_equal(actual: impl Into<Value>, expected: impl Into<Value>) -> AssertResult {
    compare(
        "strict_equal",
        "to strictly equal",
        actual.into(),
        expected.into(),
        |a, e| a.strict_eq(e),
    )
}

/// Recursive structural equality.
pub fn deep_equal(actual: impl Into<Value>, expected: impl Into<Value>) -> AssertResult {
    compare(
        "deep_equal",
        "to deeply equal",
        actual.into(),
        expected.into(),
        |a, e| a.deep_eq(e),
    )
}

pub fn not_deep_equal(actual: impl Into<Value>, expected: impl Into<Value>) -> AssertResult {
    compare(
        "not_deep_equal",
        "to not deeply equal",
        actual.into(),
        expected.into(),
        |a, e| !a.deep_eq(e),
    )
}

pub fn ok(value: impl Into<Value>) -> AssertResult {
    let actual = value.into();
    if actual.is_truthy() {
        return Ok(());
    }
    Err(AssertionFailure::new(
        "ok",
        format!("expected {} to be truthy", actual),
        actual,
        Value::Bool(true),
    ))
}

pub fn fail(message: impl Into<String>) -> AssertResult {
    Err(AssertionFailure::new(
        "fail",
        message,
        Value::Null,
        Value::Null,
    ))
}

fn compare(
    operator: &'static str,
    verb: &str,
    actual: Value,
    expected: Value,
    holds: impl Fn(&Value, &Value) -> bool,
) -> AssertResult {
    if holds(&actual, &expected) {
        return Ok(());
    }
    Err(AssertionFailure::new(
        operator,
        format!("expected {} {} {}", actual, verb, expected),
        actual,
        expected,
    ))
}

// ============================================================================
// THROW DETECTION
// ============================================================================

enum Invocation {
    Returned,
    Raised(String),
}

/// Runs `f`, treating both `Err` and a panic as "raised".
fn invoke<F, T, E>(f: F) -> Invocation
where
    F: FnOnce() -> Result<T, E>,
    E: Display,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(_)) => Invocation::Returned,
        Ok(Err(e)) => Invocation::Raised(e.to_string()),
        Err(payload) => Invocation::Raised(panic_message(payload.as_ref())),
    }
}

/// Passes when `f` returns `Err` or panics.
pub fn throws<F, T, E>(f: F) -> AssertResult
where
    F: FnOnce() -> Result<T, E>,
    E: Display,
{
    match invoke(f) {
        Invocation::Raised(_) => Ok(()),
        Invocation::Returned => Err(AssertionFailure::new(
            "throws",
            "expected [Function] to throw an error",
            Value::Null,
            Value::from("an error"),
        )),
    }
}

/// Like [`throws`], and the raised message must match `pattern`.
pub fn throws_matching<F, T, E>(f: F, pattern: &Regex) -> AssertResult
where
    F: FnOnce() -> Result<T, E>,
    E: Display,
{
    match invoke(f) {
        Invocation::Raised(message) if pattern.is_match(&message) => Ok(()),
        Invocation::Raised(message) => Err(AssertionFailure::new(
            "throws_matching",
            format!(
                "expected [Function] to throw an error matching /{}/ but '{}' was thrown",
                pattern.as_str(),
                message
            ),
            Value::from(message),
            Value::from(pattern.as_str()),
        )),
        Invocation::Returned => Err(AssertionFailure::new(
            "throws_matching",
            format!(
                "expected [Function] to throw an error matching /{}/",
                pattern.as_str()
            ),
            Value::Null,
            Value::from(pattern.as_str()),
        )),
    }
}

pub fn does_not_throw<F, T, E>(f: F) -> AssertResult
where
    F: FnOnce() -> Result<T, E>,
    E: Display,
{
    match invoke(f) {
        Invocation::Returned => Ok(()),
        Invocation::Raised(message) => Err(AssertionFailure::new(
            "does_not_throw",
            format!(
                "expected [Function] to not throw an error but '{}' was thrown",
                message
            ),
            Value::from(message),
            Value::Null,
        )),
    }
}

/// Extracts the message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked with a non-string payload".to_string()
    }
}
