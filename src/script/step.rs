//! Steps: the statements of suite-file cases and hooks.

use regex::Regex;

use crate::assert;
use crate::errors::{CaseError, CaseResult, RegistrationError};
use crate::script::eval::{key_string, Bindings, Env, Expr, Scope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    StrictEqual,
    DeepEqual,
    NotDeepEqual,
}

#[derive(Debug, Clone)]
pub enum Step {
    /// Binds names into the case scope, in order.
    Let(Vec<(String, Expr)>),
    Compare {
        comparison: Comparison,
        actual: Expr,
        expected: Expr,
    },
    Ok(Expr),
    Throws(Expr),
    ThrowsMatching(Expr, Regex),
    DoesNotThrow(Expr),
    Raise(String),
    Fail(String),
}

impl Step {
    /// Parses a single-key mapping such as `equal: [$a, 1]`.
    /// `owner` names the case or hook for error messages.
    pub fn parse(raw: &serde_yaml::Value, owner: &str) -> Result<Step, RegistrationError> {
        let invalid = |step: &str, reason: &str| RegistrationError::InvalidStep {
            step: step.to_string(),
            case: owner.to_string(),
            reason: reason.to_string(),
        };

        let mapping = raw
            .as_mapping()
            .filter(|m| m.len() == 1)
            .ok_or_else(|| invalid("?", "a step is a mapping with a single key"))?;
        let (key, arg) = mapping
            .iter()
            .next()
            .ok_or_else(|| invalid("?", "a step is a mapping with a single key"))?;
        let name = key
            .as_str()
            .ok_or_else(|| invalid("?", "step names are strings"))?;

        let pair = || -> Result<(Expr, Expr), RegistrationError> {
            match arg.as_sequence().map(Vec::as_slice) {
                Some([actual, expected]) => Ok((Expr::compile(actual)?, Expr::compile(expected)?)),
                _ => Err(invalid(name, "expects a two-element list [actual, expected]")),
            }
        };
        let compare = |comparison| -> Result<Step, RegistrationError> {
            let (actual, expected) = pair()?;
            Ok(Step::Compare {
                comparison,
                actual,
                expected,
            })
        };
        let text = || -> Result<String, RegistrationError> {
            arg.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(name, "expects a string"))
        };

        match name {
            "let" => {
                let bindings = arg
                    .as_mapping()
                    .ok_or_else(|| invalid(name, "expects a mapping of names to expressions"))?;
                bindings
                    .iter()
                    .map(|(k, v)| Ok((key_string(k)?, Expr::compile(v)?)))
                    .collect::<Result<Vec<_>, RegistrationError>>()
                    .map(Step::Let)
            }
            "equal" => compare(Comparison::Equal),
            "not_equal" => compare(Comparison::NotEqual),
            "strict_equal" => compare(Comparison::StrictEqual),
            "deep_equal" => compare(Comparison::DeepEqual),
            "not_deep_equal" => compare(Comparison::NotDeepEqual),
            "ok" => Ok(Step::Ok(Expr::compile(arg)?)),
            "throws" => Ok(Step::Throws(Expr::compile(arg)?)),
            "throws_matching" => match arg.as_sequence().map(Vec::as_slice) {
                Some([expr, serde_yaml::Value::String(pattern)]) => {
                    let regex = Regex::new(pattern)
                        .map_err(|e| invalid(name, &format!("bad pattern: {}", e)))?;
                    Ok(Step::ThrowsMatching(Expr::compile(expr)?, regex))
                }
                _ => Err(invalid(name, "expects [expression, pattern]")),
            },
            "does_not_throw" => Ok(Step::DoesNotThrow(Expr::compile(arg)?)),
            "raise" => Ok(Step::Raise(text()?)),
            "fail" => Ok(Step::Fail(text()?)),
            other => Err(invalid(other, "unknown step")),
        }
    }

    pub fn execute(&self, lexical: &Bindings, scope: &mut Scope) -> CaseResult {
        if let Step::Let(bindings) = self {
            for (name, expr) in bindings {
                let value = expr.evaluate(&Env {
                    lexical,
                    scope: &*scope,
                })?;
                scope.set(name.clone(), value);
            }
            return Ok(());
        }

        let env = Env {
            lexical,
            scope: &*scope,
        };
        let checked = match self {
            Step::Let(_) => Ok(()),
            Step::Compare {
                comparison,
                actual,
                expected,
            } => {
                let actual = actual.evaluate(&env)?;
                let expected = expected.evaluate(&env)?;
                match comparison {
                    Comparison::Equal => assert::equal(actual, expected),
                    Comparison::NotEqual => assert::not_equal(actual, expected),
                    Comparison::StrictEqual => assert::strict_equal(actual, expected),
                    Comparison::DeepEqual => assert::deep_equal(actual, expected),
                    Comparison::NotDeepEqual => assert::not_deep_equal(actual, expected),
                }
            }
            Step::Ok(expr) => assert::ok(expr.evaluate(&env)?),
            Step::Throws(expr) => assert::throws(|| expr.evaluate(&env)),
            Step::ThrowsMatching(expr, pattern) => {
                assert::throws_matching(|| expr.evaluate(&env), pattern)
            }
            Step::DoesNotThrow(expr) => assert::does_not_throw(|| expr.evaluate(&env)),
            Step::Raise(message) => return Err(CaseError::raise(message.clone())),
            Step::Fail(message) => assert::fail(message.clone()),
        };
        checked.map_err(CaseError::from)
    }
}

/// Runs steps in order; the first error ends the sequence.
pub fn run_steps(steps: &[Step], lexical: &Bindings, scope: &mut Scope) -> CaseResult {
    steps.iter().try_for_each(|step| step.execute(lexical, scope))
}

pub fn parse_steps(raw: &[serde_yaml::Value], owner: &str) -> Result<Vec<Step>, RegistrationError> {
    raw.iter().map(|step| Step::parse(step, owner)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(source: &str) -> Result<Step, RegistrationError> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(source).unwrap();
        Step::parse(&yaml, "case")
    }

    fn run(sources: &[&str]) -> CaseResult {
        let steps: Vec<Step> = sources.iter().map(|s| step(s).unwrap()).collect();
        run_steps(&steps, &Bindings::new(), &mut Scope::default())
    }

    #[test]
    fn let_then_compare() {
        run(&["let: { a: [1, 2], b: $a }", "equal: [$a, $b]", "deep_equal: [$a, [1, 2]]"])
            .unwrap();
    }

    #[test]
    fn mismatch_is_an_assertion_failure() {
        let err = run(&["equal: [1, '1']"]).unwrap_err();
        match err {
            CaseError::Assertion(failure) => {
                assert_eq!(failure.operator, "equal");
                assert_eq!(failure.message, "expected 1 to equal '1'");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn undefined_reference_is_a_runtime_error() {
        let err = run(&["equal: [$letX, true]"]).unwrap_err();
        assert_eq!(err, CaseError::raise("letX is not defined"));
    }

    #[test]
    fn throws_observes_failed_evaluation() {
        run(&["throws: $undefinedVar.x"]).unwrap();
        run(&["throws_matching: [$nope, 'not defined']"]).unwrap();
        assert!(run(&["throws: 1"]).is_err());
        assert!(run(&["does_not_throw: $nope"]).is_err());
    }

    #[test]
    fn rejects_malformed_steps() {
        assert!(matches!(
            step("equal: [1]"),
            Err(RegistrationError::InvalidStep { .. })
        ));
        assert!(matches!(
            step("{ equal: [1, 1], ok: true }"),
            Err(RegistrationError::InvalidStep { .. })
        ));
        assert!(matches!(
            step("frobnicate: 1"),
            Err(RegistrationError::InvalidStep { .. })
        ));
        assert!(matches!(
            step("throws_matching: [$a, '(']"),
            Err(RegistrationError::InvalidStep { .. })
        ));
        assert!(matches!(
            step("ok: $1"),
            Err(RegistrationError::InvalidReference { .. })
        ));
    }
}
