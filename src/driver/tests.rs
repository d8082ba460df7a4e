//! Unit tests for the driver module.
//!
//! Whole sessions run against the interpreter: item dispatch, recovery
//! after bad items, and when user-defined operators become usable.

use crate::{
    backend::interpreter::Interpreter,
    config::Config,
    errors::errors::ErrorImpl,
};

use super::driver::{Driver, Outcome};

fn session(source: &str) -> Driver<&[u8], Interpreter<Vec<u8>>> {
    Driver::new(source.as_bytes(), Interpreter::new(Vec::new()), Config::default())
}

fn run(source: &str) -> Vec<Outcome> {
    session(source).run()
}

fn failure(outcome: &Outcome) -> &ErrorImpl {
    match outcome {
        Outcome::Failed(error) => error.get_impl(),
        other => panic!("expected a failure, found {:?}", other),
    }
}

fn evaluated(value: f64) -> Outcome {
    Outcome::Evaluated { value }
}

#[test]
fn test_dispatch() {
    let outcomes = run("extern sin(x); def double(x) x * 2; double(sin(0) + 4)");

    assert_eq!(
        outcomes,
        vec![
            Outcome::Declared {
                name: String::from("sin")
            },
            Outcome::Defined {
                name: String::from("double")
            },
            evaluated(8.0),
        ]
    );
}

#[test]
fn test_empty_items_are_skipped() {
    assert_eq!(run(";;; 1 ;;\n;"), vec![evaluated(1.0)]);
    assert!(run("").is_empty());
    assert!(run("# only a comment").is_empty());
}

#[test]
fn test_end_of_input_is_permanent() {
    let mut driver = session("1");

    assert_eq!(driver.next_item(), Some(evaluated(1.0)));
    assert_eq!(driver.next_item(), None);
    assert_eq!(driver.next_item(), None);
}

#[test]
fn test_bad_definition_resynchronizes() {
    let outcomes = run("def )( bogus ; 1+1");

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(failure(&outcomes[0]), ErrorImpl::InvalidPrototype { .. }));
    assert_eq!(outcomes[1], evaluated(2.0));
}

#[test]
fn test_recovery_stops_at_next_line() {
    let outcomes = run("foo(1 2\n3 + 4");

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(failure(&outcomes[0]), ErrorImpl::UnexpectedToken { .. }));
    assert_eq!(outcomes[1], evaluated(7.0));
}

#[test]
fn test_recovery_stops_at_keyword() {
    let outcomes = run("foo(1 2 def one() 1; one()");

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(failure(&outcomes[0]), ErrorImpl::UnexpectedToken { .. }));
    assert_eq!(
        outcomes[1],
        Outcome::Defined {
            name: String::from("one")
        }
    );
    assert_eq!(outcomes[2], evaluated(1.0));
}

#[test]
fn test_failure_on_separator_consumes_only_it() {
    let outcomes = run("def foo(x ; 5");

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(failure(&outcomes[0]), ErrorImpl::UnexpectedToken { .. }));
    assert_eq!(outcomes[1], evaluated(5.0));
}

#[test]
fn test_operator_usable_after_definition() {
    let outcomes = run("def binary> 10 (a b) a < b ; 5 > 3 ; 5 > 3 < 1");

    assert_eq!(
        outcomes,
        vec![
            Outcome::Defined {
                name: String::from("binary>")
            },
            // `5 > 3` calls binary>(5, 3), which is `5 < 3`.
            evaluated(0.0),
            // Equal precedence folds left: (5 > 3) < 1.
            evaluated(1.0),
        ]
    );
}

#[test]
fn test_operator_unusable_before_definition() {
    let mut driver = session("5 > 3 ; def binary> 10 (a b) a < b ; 5 > 3");
    let outcomes = driver.run();

    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes[0], evaluated(5.0));
    assert_eq!(
        failure(&outcomes[1]),
        &ErrorImpl::UnknownOperator {
            name: String::from("unary>")
        }
    );
    assert_eq!(
        outcomes[2],
        Outcome::Defined {
            name: String::from("binary>")
        }
    );
    assert_eq!(outcomes[3], evaluated(0.0));
    assert_eq!(driver.parser().operators().precedence_of('>'), 10);
}

#[test]
fn test_operator_not_visible_in_its_own_body() {
    let outcomes = run("def binary> 10 (a b) a > b");

    assert_eq!(
        outcomes[0],
        Outcome::Defined {
            name: String::from("binary>")
        }
    );
    assert_eq!(
        failure(&outcomes[1]),
        &ErrorImpl::UnknownOperator {
            name: String::from("unary>")
        }
    );
}

#[test]
fn test_rejected_definition_does_not_commit_operator() {
    let mut driver = session("def binary> 10 (a b) c ; 5 > 3");
    let outcomes = driver.run();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(
        failure(&outcomes[0]),
        &ErrorImpl::UnknownVariable {
            name: String::from("c")
        }
    );
    assert_eq!(outcomes[1], evaluated(5.0));
    assert!(matches!(failure(&outcomes[2]), ErrorImpl::UnknownOperator { .. }));
    assert_eq!(driver.parser().operators().precedence_of('>'), -1);
}

#[test]
fn test_unary_operator_definition() {
    let mut driver = session("def unary!(v) if v then 0 else 1; !0; !!5");
    let outcomes = driver.run();

    assert_eq!(outcomes[1..], [evaluated(1.0), evaluated(1.0)]);
    assert!(driver.parser().operators().is_unary_declared('!'));
}

#[test]
fn test_lexical_error_is_reported_and_skipped() {
    let outcomes = run("1.2.3; 7");

    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        failure(&outcomes[0]),
        &ErrorImpl::MalformedNumber {
            literal: String::from("1.2.3")
        }
    );
    assert_eq!(outcomes[1], evaluated(7.0));
}

#[test]
fn test_nesting_limit_fails_item_only() {
    let source = format!("{}1{}; 2", "(".repeat(100), ")".repeat(100));
    let mut driver = Driver::new(
        source.as_bytes(),
        Interpreter::new(Vec::new()),
        Config::default().with_max_depth(16),
    );
    let outcomes = driver.run();

    assert_eq!(
        failure(&outcomes[0]),
        &ErrorImpl::NestingTooDeep { limit: 16 }
    );
    assert_eq!(outcomes.last(), Some(&evaluated(2.0)));
}

#[test]
fn test_long_operator_chain_fails_item_only() {
    let source = format!("{}1; 2", "1+".repeat(10_000));
    let outcomes = run(&source);

    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        failure(&outcomes[0]),
        &ErrorImpl::NestingTooDeep { limit: 256 }
    );
    assert_eq!(outcomes[1], evaluated(2.0));
}

#[test]
fn test_program_output_reaches_backend_sink() {
    let mut driver = session("extern putchard(c); putchard(72); putchard(105)");
    driver.run();

    let output = driver.into_backend().into_output();
    assert_eq!(String::from_utf8(output).unwrap(), "Hi");
}
