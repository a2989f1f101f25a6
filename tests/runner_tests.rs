// Runner behaviour: ordering, hooks, isolation and selection.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use suitecase::assert;
use suitecase::config::{ColorMode, RunConfig};
use suitecase::errors::{CaseError, RegistrationError};
use suitecase::runner::{Outcome, Phase};
use suitecase::suite::Suite;

use common::{labels, outcome_of, run, run_with};

#[test]
fn one_result_per_case_in_declaration_order() {
    let suite = Suite::<()>::build("", |s| {
        s.it("a", |_| Ok(()));
        s.describe("outer", |s| {
            s.it("b", |_| Ok(()));
            s.describe("inner", |s| {
                s.it("c", |_| Ok(()));
            });
            s.it("d", |_| Ok(()));
        });
        s.it("e", |_| Ok(()));
    })
    .unwrap();

    let report = run(&suite);
    let names: Vec<String> = report.results.iter().map(|r| r.qualified_name()).collect();
    assert_eq!(
        names,
        vec!["a", "outer > b", "outer > inner > c", "outer > d", "e"]
    );
    assert_eq!(report.summary().total, suite.case_count());
}

#[test]
fn named_root_prefixes_every_path() {
    let suite = Suite::<()>::build("root", |s| {
        s.describe("group", |s| {
            s.it("case", |_| Ok(()));
        });
    })
    .unwrap();
    let report = run(&suite);
    assert_eq!(
        report.results[0].path,
        vec!["root".to_string(), "group".to_string(), "case".to_string()]
    );
    assert_eq!(report.results[0].name(), "case");
}

#[test]
fn hooks_run_outermost_first_before_every_case() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));

    let suite = Suite::<()>::build("", |s| {
        let outer = log.clone();
        s.before_each(move |_| {
            outer.borrow_mut().push("outer".into());
            Ok(())
        });
        s.describe("group", |s| {
            let inner = log.clone();
            s.before_each(move |_| {
                inner.borrow_mut().push("inner".into());
                Ok(())
            });
            let body = log.clone();
            s.it("fails", move |_| {
                body.borrow_mut().push("fails".into());
                assert::equal(1, 2)?;
                Ok(())
            });
            let body = log.clone();
            s.it("passes", move |_| {
                body.borrow_mut().push("passes".into());
                Ok(())
            });
        });
        let body = log.clone();
        s.it("top", move |_| {
            body.borrow_mut().push("top".into());
            Ok(())
        });
    })
    .unwrap();

    run(&suite);
    assert_eq!(
        *log.borrow(),
        vec!["outer", "inner", "fails", "outer", "inner", "passes", "outer", "top"]
    );
}

#[test]
fn every_case_gets_a_fresh_fixture() {
    let suite = Suite::<Vec<i32>>::build("", |s| {
        s.before_each(|items| {
            items.push(1);
            Ok(())
        });
        s.it("mutates", |items| {
            items.push(2);
            items.clear();
            Ok(())
        });
        s.it("sees a clean fixture", |items| {
            assert::equal(items.len(), 1)?;
            assert::equal(items[0], 1)?;
            Ok(())
        });
    })
    .unwrap();

    let report = run(&suite);
    assert!(report.is_success(), "{:?}", labels(&report));
}

#[test]
fn failures_errors_and_panics_stay_inside_their_case() {
    let suite = Suite::<()>::build("", |s| {
        s.it("fails", |_| {
            assert::deep_equal(1, 2)?;
            Ok(())
        });
        s.it("raises", |_| Err(CaseError::raise("letX is not defined")));
        s.it("panics", |_| panic!("boom"));
        s.it("still runs", |_| Ok(()));
    })
    .unwrap();

    let report = run(&suite);
    assert_eq!(
        labels(&report),
        vec![
            ("fails".to_string(), "FAIL"),
            ("raises".to_string(), "ERROR"),
            ("panics".to_string(), "ERROR"),
            ("still runs".to_string(), "PASS"),
        ]
    );
    match outcome_of(&report, "raises") {
        Outcome::Errored { phase, detail } => {
            assert_eq!(*phase, Phase::Body);
            assert_eq!(detail, "letX is not defined");
        }
        other => panic!("unexpected {other:?}"),
    }
    match outcome_of(&report, "panics") {
        Outcome::Errored { detail, .. } => assert_eq!(detail, "panicked: boom"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn hook_errors_mark_the_case_errored_without_running_the_body() {
    let ran = Rc::new(RefCell::new(false));
    let suite = Suite::<()>::build("", |s| {
        s.before_each(|_| Err(CaseError::raise("setup broke")));
        let flag = ran.clone();
        s.it("body", move |_| {
            *flag.borrow_mut() = true;
            Ok(())
        });
    })
    .unwrap();

    let report = run(&suite);
    assert!(!*ran.borrow());
    assert_eq!(
        outcome_of(&report, "body"),
        &Outcome::Errored {
            phase: Phase::Hook,
            detail: "setup broke".to_string(),
        }
    );
}

#[test]
fn a_failing_hook_only_affects_the_case_it_ran_for() {
    let calls = Rc::new(RefCell::new(0));
    let suite = Suite::<()>::build("", |s| {
        let counter = calls.clone();
        s.before_each(move |_| {
            *counter.borrow_mut() += 1;
            if *counter.borrow() == 1 {
                return Err(CaseError::raise("first call fails"));
            }
            Ok(())
        });
        s.before_each(|_| {
            assert::equal(1, 1)?;
            Ok(())
        });
        s.it("a", |_| Ok(()));
        s.it("b", |_| Ok(()));
    })
    .unwrap();

    let report = run(&suite);
    assert_eq!(
        outcome_of(&report, "a"),
        &Outcome::Errored {
            phase: Phase::Hook,
            detail: "first call fails".to_string(),
        }
    );
    assert!(outcome_of(&report, "b").is_passed());
    assert_eq!(*calls.borrow(), 2);
}

#[test]
fn hooks_of_one_suite_run_in_declaration_order() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    let suite = Suite::<()>::build("", |s| {
        for name in ["first", "second", "third"] {
            let log = log.clone();
            s.before_each(move |_| {
                log.borrow_mut().push(name.to_string());
                Ok(())
            });
        }
        s.it("a", |_| Ok(()));
        s.it("b", |_| Ok(()));
    })
    .unwrap();

    run(&suite);
    assert_eq!(
        *log.borrow(),
        vec!["first", "second", "third", "first", "second", "third"]
    );
}

#[test]
fn hook_assertion_failures_and_panics_are_errors_not_failures() {
    let suite = Suite::<()>::build("", |s| {
        s.describe("asserting hook", |s| {
            s.before_each(|_| {
                assert::equal(1, 2)?;
                Ok(())
            });
            s.it("after a hook assertion", |_| Ok(()));
        });
        s.describe("panicking hook", |s| {
            s.before_each(|_| panic!("hook blew up"));
            s.it("after a hook panic", |_| Ok(()));
        });
    })
    .unwrap();

    let report = run(&suite);
    assert_eq!(
        outcome_of(&report, "after a hook assertion"),
        &Outcome::Errored {
            phase: Phase::Hook,
            detail: "expected 1 to equal 2".to_string(),
        }
    );
    assert_eq!(
        outcome_of(&report, "after a hook panic"),
        &Outcome::Errored {
            phase: Phase::Hook,
            detail: "panicked: hook blew up".to_string(),
        }
    );
    assert_eq!(report.summary().failed, 0);
    assert_eq!(report.summary().errored, 2);
}

#[test]
fn only_focuses_and_skip_excludes() {
    let suite = Suite::<()>::build("", |s| {
        s.it("plain", |_| Ok(()));
        s.it_only("focused", |_| Ok(()));
        s.describe_only("focused group", |s| {
            s.it("inside", |_| Ok(()));
            s.it_skip("skipped inside", |_| Ok(()));
        });
    })
    .unwrap();

    let report = run(&suite);
    assert_eq!(
        outcome_of(&report, "plain"),
        &Outcome::Skipped {
            reason: "Not marked 'only' in 'only' mode".to_string()
        }
    );
    assert!(outcome_of(&report, "focused").is_passed());
    assert!(outcome_of(&report, "inside").is_passed());
    assert_eq!(
        outcome_of(&report, "skipped inside"),
        &Outcome::Skipped {
            reason: "Marked 'skip'".to_string()
        }
    );
    assert!(report.is_success());
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn skipped_suites_skip_their_hooks_too() {
    let calls = Rc::new(RefCell::new(0));
    let suite = Suite::<()>::build("", |s| {
        s.describe_skip("off", |s| {
            let calls = calls.clone();
            s.before_each(move |_| {
                *calls.borrow_mut() += 1;
                Ok(())
            });
            s.it("never", |_| panic!("should not run"));
        });
    })
    .unwrap();

    let report = run(&suite);
    assert_eq!(*calls.borrow(), 0);
    assert_eq!(report.summary().skipped, 1);
}

#[test]
fn filter_matches_qualified_names_case_insensitively() {
    let suite = Suite::<()>::build("", |s| {
        s.describe("Objects", |s| {
            s.it("reads a field", |_| Ok(()));
        });
        s.it("other", |_| Ok(()));
    })
    .unwrap();

    let config = RunConfig::default()
        .with_color(ColorMode::Never)
        .with_filter("OBJECTS >");
    let report = run_with(&suite, config);
    assert!(outcome_of(&report, "reads a field").is_passed());
    assert_eq!(
        outcome_of(&report, "other"),
        &Outcome::Skipped {
            reason: "Filtered out by substring: OBJECTS >".to_string()
        }
    );
}

#[test]
fn empty_names_abort_registration() {
    let err = Suite::<()>::build("", |s| {
        s.describe("group", |s| {
            s.it("  ", |_| Ok(()));
        });
        s.it("after", |_| Ok(()));
    })
    .err()
    .expect("registration should fail");
    match err {
        RegistrationError::EmptyName { kind, parent } => {
            assert_eq!(kind, "it");
            assert_eq!(parent, "group");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn empty_tree_is_a_successful_run() {
    let suite = Suite::<()>::build("", |_| {}).unwrap();
    let report = run(&suite);
    assert!(report.results.is_empty());
    assert_eq!(report.summary().success_rate(), 0.0);
    assert_eq!(report.exit_code(), 0);
}
