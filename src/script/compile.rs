//! Compiles parsed suite files into the suite registry.

use crate::errors::RegistrationError;
use crate::script::document::{CaseDoc, DescribeDoc, EntryDoc};
use crate::script::eval::{key_string, Bindings, Env, Expr, Scope};
use crate::script::step::{parse_steps, run_steps};
use crate::suite::{Mode, SuiteBuilder};

/// Registers `entries` into `builder`, in order.
///
/// `lexical` holds the registration-time bindings visible at this point;
/// each hook and case captures the snapshot current at its declaration.
pub fn compile_entries(builder: &mut SuiteBuilder<Scope>, entries: Vec<EntryDoc>, lexical: Bindings) {
    let mut lexical = lexical;
    for entry in entries {
        if builder.is_rejected() {
            return;
        }
        match entry {
            EntryDoc::Let(doc) => match bind(builder.name(), &doc.bindings, &lexical) {
                Ok(next) => lexical = next,
                Err(err) => builder.reject(err),
            },
            EntryDoc::Hook(doc) => {
                let owner = format!("before_each in {}", builder.name());
                match parse_steps(&doc.before_each, &owner) {
                    Ok(steps) => {
                        let lexical = lexical.clone();
                        builder.before_each(move |scope| run_steps(&steps, &lexical, scope));
                    }
                    Err(err) => builder.reject(err),
                }
            }
            EntryDoc::Case(doc) => compile_case(builder, doc, &lexical),
            EntryDoc::Describe(doc) => compile_describe(builder, doc, &lexical),
        }
    }
}

fn compile_case(builder: &mut SuiteBuilder<Scope>, doc: CaseDoc, lexical: &Bindings) {
    let compiled = mode(&doc.it, doc.skip, doc.only)
        .and_then(|mode| parse_steps(&doc.steps, &doc.it).map(|steps| (mode, steps)));
    match compiled {
        Ok((mode, steps)) => {
            let lexical = lexical.clone();
            builder.it_with(doc.it, mode, move |scope| {
                run_steps(&steps, &lexical, scope)
            });
        }
        Err(err) => builder.reject(err),
    }
}

fn compile_describe(builder: &mut SuiteBuilder<Scope>, doc: DescribeDoc, lexical: &Bindings) {
    match mode(&doc.describe, doc.skip, doc.only) {
        Ok(mode) => {
            let lexical = lexical.clone();
            let body = doc.body;
            builder.describe_with(doc.describe, mode, move |child| {
                compile_entries(child, body, lexical)
            });
        }
        Err(err) => builder.reject(err),
    }
}

fn mode(name: &str, skip: bool, only: bool) -> Result<Mode, RegistrationError> {
    match (skip, only) {
        (true, true) => Err(RegistrationError::InvalidStep {
            step: "only".to_string(),
            case: name.to_string(),
            reason: "a block cannot be both skip and only".to_string(),
        }),
        (true, false) => Ok(Mode::Skip),
        (false, true) => Ok(Mode::Only),
        (false, false) => Ok(Mode::Normal),
    }
}

/// Evaluates a registration-time `let` on top of `lexical`.
fn bind(
    suite: &str,
    bindings: &serde_yaml::Mapping,
    lexical: &Bindings,
) -> Result<Bindings, RegistrationError> {
    let empty = Scope::default();
    let mut next = lexical.clone();
    for (key, value) in bindings {
        let name = key_string(key)?;
        let value = Expr::compile(value)?
            .evaluate(&Env {
                lexical: &next,
                scope: &empty,
            })
            .map_err(|source| RegistrationError::Body {
                suite: if suite.is_empty() { "<root>".to_string() } else { suite.to_string() },
                source,
            })?;
        next.insert(name, value);
    }
    Ok(next)
}
