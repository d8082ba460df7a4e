//! Integration tests for whole sessions.
//!
//! These run source files through the public API: lexer, parser, driver
//! and the interpreter backend.

use std::{fs::File, io::BufReader};

use kaleidoscope::{
    backend::interpreter::Interpreter,
    config::Config,
    driver::driver::{Driver, Outcome},
    errors::errors::{ErrorImpl, ErrorKind},
    lexer::{lexer::tokenize, tokens::TokenKind},
};

fn run_fixture(name: &str) -> (Vec<Outcome>, String) {
    let file = File::open(format!("tests/fixtures/{}", name)).unwrap();
    let mut driver = Driver::new(
        BufReader::new(file),
        Interpreter::new(Vec::new()),
        Config::default(),
    );

    let outcomes = driver.run();
    let output = String::from_utf8(driver.into_backend().into_output()).unwrap();

    (outcomes, output)
}

fn values(outcomes: &[Outcome]) -> Vec<f64> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            Outcome::Evaluated { value } => Some(*value),
            _ => None,
        })
        .collect()
}

fn errors(outcomes: &[Outcome]) -> Vec<ErrorImpl> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            Outcome::Failed(error) => Some(error.get_impl().clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_user_defined_operators() {
    let (outcomes, _) = run_fixture("operators.kal");

    assert!(errors(&outcomes).is_empty(), "{:?}", outcomes);
    assert_eq!(
        outcomes
            .iter()
            .filter(|outcome| matches!(outcome, Outcome::Defined { .. }))
            .count(),
        5
    );
    assert_eq!(values(&outcomes), vec![1.0, 1.0, 0.0, 1.0, -3.0]);
}

#[test]
fn test_loops_and_mutation() {
    let (outcomes, output) = run_fixture("loops.kal");

    assert!(errors(&outcomes).is_empty(), "{:?}", outcomes);
    assert_eq!(values(&outcomes), vec![0.0, 55.0]);
    assert_eq!(output, "*****");
}

#[test]
fn test_session_survives_bad_items() {
    let (outcomes, _) = run_fixture("errors.kal");

    let errors = errors(&outcomes);
    assert_eq!(errors.len(), 4, "{:?}", outcomes);
    assert!(matches!(errors[0], ErrorImpl::InvalidPrototype { .. }));
    assert!(matches!(errors[1], ErrorImpl::UnknownVariable { .. }));
    assert!(matches!(errors[2], ErrorImpl::MalformedNumber { .. }));
    assert!(matches!(errors[3], ErrorImpl::UnexpectedToken { .. }));

    assert_eq!(values(&outcomes), vec![42.0]);
}

#[test]
fn test_error_kinds() {
    let mut driver = Driver::new(
        "def )( x; def g() h(); 1.2.3; extern nothing(); nothing()".as_bytes(),
        Interpreter::new(Vec::new()),
        Config::default(),
    );

    let kinds: Vec<ErrorKind> = driver
        .run()
        .iter()
        .filter_map(|outcome| match outcome {
            Outcome::Failed(error) => Some(error.kind()),
            _ => None,
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            ErrorKind::Syntax,
            ErrorKind::Semantic,
            ErrorKind::Lexical,
            ErrorKind::Runtime
        ]
    );
}

#[test]
fn test_tokenize() {
    let (tokens, errors) = tokenize("def f(x) x # trailing");

    assert!(errors.is_empty());
    assert_eq!(
        tokens.iter().map(|token| token.kind.clone()).collect::<Vec<_>>(),
        vec![
            TokenKind::Def,
            TokenKind::Identifier(String::from("f")),
            TokenKind::Char(b'('),
            TokenKind::Identifier(String::from("x")),
            TokenKind::Char(b')'),
            TokenKind::Identifier(String::from("x")),
            TokenKind::EOF,
        ]
    );
}
