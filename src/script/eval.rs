//! Expressions, scopes and evaluation for suite files.

use std::collections::BTreeMap;

use crate::errors::{RegistrationError, RuntimeError};
use crate::script::reference::{Accessor, Reference};
use crate::value::Value;

/// Persistent name → value map; cloned into every compiled hook and case.
pub type Bindings = im::HashMap<String, Value>;

/// Per-case fixture of script suites: the names bound by `let` steps.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: Bindings,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Name resolution: the case scope shadows registration-time bindings.
pub struct Env<'a> {
    pub lexical: &'a Bindings,
    pub scope: &'a Scope,
}

impl Env<'_> {
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scope.get(name).or_else(|| self.lexical.get(name))
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Value),
    Reference(Reference),
    List(Vec<Expr>),
    Map(Vec<(String, Expr)>),
}

impl Expr {
    /// Compiles a YAML value. Strings starting with `$` are references,
    /// `$$` escapes a literal dollar sign.
    pub fn compile(yaml: &serde_yaml::Value) -> Result<Expr, RegistrationError> {
        use serde_yaml::Value as Yaml;

        match yaml {
            Yaml::Null => Ok(Expr::Literal(Value::Null)),
            Yaml::Bool(b) => Ok(Expr::Literal(Value::Bool(*b))),
            Yaml::Number(n) => n
                .as_f64()
                .map(|n| Expr::Literal(Value::Number(n)))
                .ok_or_else(|| invalid(yaml, "number out of range")),
            Yaml::String(s) if s.starts_with("$$") => Ok(Expr::Literal(Value::from(&s[1..]))),
            Yaml::String(s) if s.starts_with('$') => Reference::parse(s).map(Expr::Reference),
            Yaml::String(s) => Ok(Expr::Literal(Value::from(s.as_str()))),
            Yaml::Sequence(items) => items
                .iter()
                .map(Expr::compile)
                .collect::<Result<Vec<_>, _>>()
                .map(Expr::List),
            Yaml::Mapping(entries) => entries
                .iter()
                .map(|(key, value)| Ok((key_string(key)?, Expr::compile(value)?)))
                .collect::<Result<Vec<_>, RegistrationError>>()
                .map(Expr::Map),
            Yaml::Tagged(_) => Err(invalid(yaml, "YAML tags are not supported")),
        }
    }

    /// Lists and maps are built fresh on every evaluation, so two literal
    /// lists never share an identity.
    pub fn evaluate(&self, env: &Env<'_>) -> Result<Value, RuntimeError> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Reference(reference) => resolve(reference, env),
            Expr::List(items) => items
                .iter()
                .map(|item| item.evaluate(env))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::from),
            Expr::Map(entries) => entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), item.evaluate(env)?)))
                .collect::<Result<BTreeMap<_, _>, RuntimeError>>()
                .map(Value::from),
        }
    }
}

/// Map keys are strings; numbers and booleans are stringified.
pub fn key_string(key: &serde_yaml::Value) -> Result<String, RegistrationError> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s.clone()),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        other => Err(invalid(
            other,
            "map keys must be strings, numbers or booleans",
        )),
    }
}

fn invalid(yaml: &serde_yaml::Value, reason: &str) -> RegistrationError {
    let expression = serde_yaml::to_string(yaml)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{:?}", yaml));
    RegistrationError::InvalidExpression {
        expression,
        reason: reason.to_string(),
    }
}

fn resolve(reference: &Reference, env: &Env<'_>) -> Result<Value, RuntimeError> {
    let mut current = env
        .lookup(&reference.root)
        .cloned()
        .ok_or_else(|| RuntimeError::new(format!("{} is not defined", reference.root)))?;
    for accessor in &reference.accessors {
        current = access(&current, accessor)?;
    }
    Ok(current)
}

fn access(value: &Value, accessor: &Accessor) -> Result<Value, RuntimeError> {
    match (value, accessor) {
        (Value::Null, _) => Err(RuntimeError::new(format!(
            "cannot read property '{}' of null",
            accessor
        ))),
        (Value::Map(entries), Accessor::Field(key)) => {
            Ok(entries.get(key).cloned().unwrap_or_default())
        }
        (Value::Map(entries), Accessor::Index(index)) => {
            Ok(entries.get(&index.to_string()).cloned().unwrap_or_default())
        }
        (Value::List(items), Accessor::Field(name)) if name == "length" => {
            Ok(Value::from(items.len()))
        }
        (Value::List(items), Accessor::Index(index)) => {
            Ok(items.get(*index).cloned().unwrap_or_default())
        }
        (Value::String(s), Accessor::Field(name)) if name == "length" => {
            Ok(Value::from(s.chars().count()))
        }
        (Value::String(s), Accessor::Index(index)) => Ok(s
            .chars()
            .nth(*index)
            .map(|c| Value::from(c.to_string()))
            .unwrap_or_default()),
        _ => Ok(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str, scope: &Scope) -> Result<Value, RuntimeError> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(source).unwrap();
        let expr = Expr::compile(&yaml).unwrap();
        let lexical = Bindings::new();
        expr.evaluate(&Env {
            lexical: &lexical,
            scope,
        })
    }

    fn sample_scope() -> Scope {
        let mut scope = Scope::default();
        scope.set(
            "obj",
            Value::map([("x", Value::from(1)), ("items", Value::list([10, 20]))]),
        );
        scope.set("word", Value::from("hey"));
        scope
    }

    #[test]
    fn resolves_fields_indices_and_length() {
        let scope = sample_scope();
        assert_eq!(eval("$obj.x", &scope).unwrap(), Value::from(1));
        assert_eq!(eval("$obj.items[1]", &scope).unwrap(), Value::from(20));
        assert_eq!(eval("$obj.items.length", &scope).unwrap(), Value::from(2));
        assert_eq!(eval("$word[0]", &scope).unwrap(), Value::from("h"));
        assert_eq!(eval("$obj.missing", &scope).unwrap(), Value::Null);
    }

    #[test]
    fn undefined_names_and_null_access_raise() {
        let scope = sample_scope();
        let err = eval("$undefinedVar.x", &scope).unwrap_err();
        assert_eq!(err.message(), "undefinedVar is not defined");
        let err = eval("$obj.missing.x", &scope).unwrap_err();
        assert_eq!(err.message(), "cannot read property 'x' of null");
    }

    #[test]
    fn builds_nested_values_and_escapes_dollars() {
        let scope = sample_scope();
        let value = eval("{ a: [1, $obj.x], price: '$$5' }", &scope).unwrap();
        assert_eq!(
            value,
            Value::map([
                ("a", Value::list([1, 1])),
                ("price", Value::from("$5")),
            ])
        );
    }

    #[test]
    fn references_share_identity_literals_do_not() {
        let scope = sample_scope();
        let a = eval("$obj", &scope).unwrap();
        let b = eval("$obj", &scope).unwrap();
        assert!(a.strict_eq(&b));
        let c = eval("[1]", &scope).unwrap();
        let d = eval("[1]", &scope).unwrap();
        assert!(!c.strict_eq(&d));
    }

    #[test]
    fn scope_shadows_lexical_bindings() {
        let mut lexical = Bindings::new();
        lexical.insert("x".to_string(), Value::from(1));
        let mut scope = Scope::default();
        let env = Env {
            lexical: &lexical,
            scope: &scope,
        };
        assert_eq!(env.lookup("x"), Some(&Value::from(1)));
        scope.set("x", Value::from(2));
        let env = Env {
            lexical: &lexical,
            scope: &scope,
        };
        assert_eq!(env.lookup("x"), Some(&Value::from(2)));
    }
}
