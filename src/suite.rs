//! Suite registry.
//!
//! A suite tree is built once, by running registration closures, and is
//! read-only afterwards. The builder is only reachable from inside
//! `describe` bodies; case bodies and hooks receive the per-case fixture
//! instead, so registering while a case runs cannot be expressed.
//!
//! ```rust
//! use suitecase::assert;
//! use suitecase::suite::Suite;
//!
//! let suite = Suite::<Vec<i32>>::build("numbers", |s| {
//!     s.before_each(|items| {
//!         items.push(1);
//!         Ok(())
//!     });
//!     s.it("starts with one item", |items| {
//!         assert::equal(items.len(), 1)?;
//!         Ok(())
//!     });
//! })
//! .unwrap();
//! assert_eq!(suite.case_count(), 1);
//! ```

use std::fmt;

use crate::errors::{CaseResult, RegistrationError};

/// Setup logic run before every case in its suite and all nested suites.
pub type Hook<F> = Box<dyn Fn(&mut F) -> CaseResult>;

/// A case body.
pub type Body<F> = Box<dyn Fn(&mut F) -> CaseResult>;

/// Whether a node is excluded, focused, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Skip,
    Only,
}

pub struct Case<F> {
    name: String,
    body: Body<F>,
    mode: Mode,
}

impl<F> Case<F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn run(&self, fixture: &mut F) -> CaseResult {
        (self.body)(fixture)
    }
}

impl<F> fmt::Debug for Case<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// A suite's children, in declaration order.
pub enum Entry<F> {
    Case(Case<F>),
    Suite(Suite<F>),
}

impl<F> fmt::Debug for Entry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Case(case) => fmt::Debug::fmt(case, f),
            Entry::Suite(suite) => fmt::Debug::fmt(suite, f),
        }
    }
}

pub struct Suite<F = ()> {
    name: String,
    hooks: Vec<Hook<F>>,
    entries: Vec<Entry<F>>,
    mode: Mode,
}

impl<F> fmt::Debug for Suite<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("hooks", &self.hooks.len())
            .field("entries", &self.entries)
            .finish()
    }
}

impl<F> Suite<F> {
    /// Creates the root suite and runs `body` to collect its declarations.
    ///
    /// The root may be unnamed; an empty root name is left out of qualified
    /// case names. The first registration error aborts the whole build.
    pub fn build(
        name: impl Into<String>,
        body: impl FnOnce(&mut SuiteBuilder<F>),
    ) -> Result<Suite<F>, RegistrationError> {
        let mut builder = SuiteBuilder::new(name.into(), Mode::Normal);
        body(&mut builder);
        builder.finish()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn hooks(&self) -> &[Hook<F>] {
        &self.hooks
    }

    pub fn entries(&self) -> &[Entry<F>] {
        &self.entries
    }

    /// Cases declared directly in this suite.
    pub fn cases(&self) -> impl Iterator<Item = &Case<F>> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Case(case) => Some(case),
            Entry::Suite(_) => None,
        })
    }

    /// Suites declared directly in this suite.
    pub fn suites(&self) -> impl Iterator<Item = &Suite<F>> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Suite(suite) => Some(suite),
            Entry::Case(_) => None,
        })
    }

    /// Number of cases in this suite and all descendants.
    pub fn case_count(&self) -> usize {
        self.cases().count() + self.suites().map(Suite::case_count).sum::<usize>()
    }

    /// True if this suite or anything below it is marked `only`.
    pub fn has_only(&self) -> bool {
        self.mode == Mode::Only
            || self.cases().any(|case| case.mode == Mode::Only)
            || self.suites().any(Suite::has_only)
    }
}

/// Collects declarations for one suite node.
pub struct SuiteBuilder<F> {
    name: String,
    mode: Mode,
    hooks: Vec<Hook<F>>,
    entries: Vec<Entry<F>>,
    error: Option<RegistrationError>,
}

impl<F> SuiteBuilder<F> {
    fn new(name: String, mode: Mode) -> Self {
        Self {
            name,
            mode,
            hooks: Vec::new(),
            entries: Vec::new(),
            error: None,
        }
    }

    /// Name of the suite being registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn describe(
        &mut self,
        name: impl Into<String>,
        body: impl FnOnce(&mut SuiteBuilder<F>),
    ) -> &mut Self {
        self.describe_with(name.into(), Mode::Normal, body)
    }

    pub fn describe_skip(
        &mut self,
        name: impl Into<String>,
        body: impl FnOnce(&mut SuiteBuilder<F>),
    ) -> &mut Self {
        self.describe_with(name.into(), Mode::Skip, body)
    }

    pub fn describe_only(
        &mut self,
        name: impl Into<String>,
        body: impl FnOnce(&mut SuiteBuilder<F>),
    ) -> &mut Self {
        self.describe_with(name.into(), Mode::Only, body)
    }

    /// Defines a nested suite and runs `body` right away to fill it.
    pub fn describe_with(
        &mut self,
        name: String,
        mode: Mode,
        body: impl FnOnce(&mut SuiteBuilder<F>),
    ) -> &mut Self {
        if name.trim().is_empty() {
            self.reject(RegistrationError::EmptyName {
                kind: "describe",
                parent: self.name.clone(),
            });
            return self;
        }
        let mut child = SuiteBuilder::new(name, mode);
        body(&mut child);
        match child.finish() {
            Ok(suite) => self.entries.push(Entry::Suite(suite)),
            Err(err) => self.reject(err),
        }
        self
    }

    pub fn it(
        &mut self,
        name: impl Into<String>,
        body: impl Fn(&mut F) -> CaseResult + 'static,
    ) -> &mut Self {
        self.it_with(name.into(), Mode::Normal, body)
    }

    pub fn it_skip(
        &mut self,
        name: impl Into<String>,
        body: impl Fn(&mut F) -> CaseResult + 'static,
    ) -> &mut Self {
        self.it_with(name.into(), Mode::Skip, body)
    }

    pub fn it_only(
        &mut self,
        name: impl Into<String>,
        body: impl Fn(&mut F) -> CaseResult + 'static,
    ) -> &mut Self {
        self.it_with(name.into(), Mode::Only, body)
    }

    pub fn it_with(
        &mut self,
        name: String,
        mode: Mode,
        body: impl Fn(&mut F) -> CaseResult + 'static,
    ) -> &mut Self {
        if name.trim().is_empty() {
            self.reject(RegistrationError::EmptyName {
                kind: "it",
                parent: self.name.clone(),
            });
            return self;
        }
        self.entries.push(Entry::Case(Case {
            name,
            body: Box::new(body),
            mode,
        }));
        self
    }

    pub fn before_each(&mut self, hook: impl Fn(&mut F) -> CaseResult + 'static) -> &mut Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Records a registration error. Only the first one is kept.
    pub fn reject(&mut self, error: RegistrationError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.error.is_some()
    }

    fn finish(self) -> Result<Suite<F>, RegistrationError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(Suite {
            name: self.name,
            hooks: self.hooks,
            entries: self.entries,
            mode: self.mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_declaration_order() {
        let suite = Suite::<()>::build("", |s| {
            s.it("first", |_| Ok(()));
            s.describe("group", |s| {
                s.it("nested", |_| Ok(()));
            });
            s.it("last", |_| Ok(()));
        })
        .unwrap();

        let names: Vec<&str> = suite
            .entries()
            .iter()
            .map(|entry| match entry {
                Entry::Case(case) => case.name(),
                Entry::Suite(suite) => suite.name(),
            })
            .collect();
        assert_eq!(names, vec!["first", "group", "last"]);
        assert_eq!(suite.cases().count(), 2);
        assert_eq!(suite.suites().count(), 1);
        assert_eq!(suite.case_count(), 3);
    }

    #[test]
    fn same_name_registers_a_sibling() {
        let suite = Suite::<()>::build("", |s| {
            s.describe("twice", |s| {
                s.it("a", |_| Ok(()));
            });
            s.describe("twice", |s| {
                s.it("b", |_| Ok(()));
            });
        })
        .unwrap();
        assert_eq!(suite.suites().count(), 2);
        assert!(suite.suites().all(|child| child.case_count() == 1));
    }

    #[test]
    fn empty_names_are_rejected() {
        let err = Suite::<()>::build("root", |s| {
            s.describe("outer", |s| {
                s.it("  ", |_| Ok(()));
            });
        })
        .err()
        .unwrap();
        match err {
            RegistrationError::EmptyName { kind, parent } => {
                assert_eq!(kind, "it");
                assert_eq!(parent, "outer");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn first_error_wins() {
        let err = Suite::<()>::build("root", |s| {
            s.describe("", |_| {});
            s.it("", |_| Ok(()));
        })
        .err()
        .unwrap();
        assert!(matches!(
            err,
            RegistrationError::EmptyName {
                kind: "describe",
                ..
            }
        ));
    }

    #[test]
    fn only_is_found_anywhere_in_the_tree() {
        let suite = Suite::<()>::build("", |s| {
            s.describe("a", |s| {
                s.describe("b", |s| {
                    s.it_only("c", |_| Ok(()));
                });
            });
        })
        .unwrap();
        assert!(suite.has_only());
    }
}
