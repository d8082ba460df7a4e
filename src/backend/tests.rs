//! Unit tests for the backend module.
//!
//! These exercise the reference interpreter directly: arithmetic, control
//! flow, scoping, host functions, and the definition-time checks.

use crate::{
    ast::{
        ast::Expr,
        statements::{FunctionDef, Prototype},
    },
    config::{Config, DEFAULT_MAX_CALL_DEPTH},
    errors::errors::{Error, ErrorImpl, ErrorKind},
    lexer::lexer::Lexer,
    parser::{
        expr::parse_expression,
        parser::Parser,
        stmt::{parse_definition, parse_extern, parse_toplevel},
    },
    Position,
};

use super::{check::is_builtin_binary, interpreter::Interpreter, Backend};

fn parser(source: &str) -> Parser<&[u8]> {
    Parser::new(Lexer::new(source.as_bytes()))
}

fn interpreter() -> Interpreter<Vec<u8>> {
    Interpreter::new(Vec::new())
}

fn define(backend: &mut impl Backend, source: &str) -> Result<(), Error> {
    backend.define(parse_definition(&mut parser(source)).unwrap())
}

fn declare(backend: &mut impl Backend, source: &str) -> Result<(), Error> {
    backend.declare(parse_extern(&mut parser(source)).unwrap())
}

fn evaluate(backend: &mut impl Backend, source: &str) -> Result<f64, Error> {
    backend.evaluate(parse_toplevel(&mut parser(source)).unwrap())
}

fn anonymous(body: Expr) -> FunctionDef {
    FunctionDef {
        proto: Prototype::function("__anon_expr0", vec![], Position::start()),
        body,
    }
}

#[test]
fn test_arithmetic() {
    let mut interp = interpreter();

    assert_eq!(evaluate(&mut interp, "1 + 2 * 3").unwrap(), 7.0);
    assert_eq!(evaluate(&mut interp, "10 / 4").unwrap(), 2.5);
    assert_eq!(evaluate(&mut interp, "8 - 2 - 1").unwrap(), 5.0);
    assert_eq!(evaluate(&mut interp, "1 < 2").unwrap(), 1.0);
    assert_eq!(evaluate(&mut interp, "2 < 1").unwrap(), 0.0);
    assert_eq!(evaluate(&mut interp, "2 < 2").unwrap(), 0.0);
}

#[test]
fn test_less_than_is_unordered() {
    let mut interp = interpreter();

    assert_eq!(evaluate(&mut interp, "0/0 < 1").unwrap(), 1.0);
    assert_eq!(evaluate(&mut interp, "1 < 0/0").unwrap(), 1.0);
}

#[test]
fn test_if_condition() {
    let mut interp = interpreter();

    assert_eq!(evaluate(&mut interp, "if 0 then 1 else 2").unwrap(), 2.0);
    assert_eq!(evaluate(&mut interp, "if 0.5 then 1 else 2").unwrap(), 1.0);
    assert_eq!(evaluate(&mut interp, "if 0/0 then 1 else 2").unwrap(), 2.0);
}

#[test]
fn test_define_and_call() {
    let mut interp = interpreter();

    define(&mut interp, "def add(a b) a + b").unwrap();
    assert_eq!(evaluate(&mut interp, "add(2, 3)").unwrap(), 5.0);

    define(&mut interp, "def fib(x) if x < 3 then 1 else fib(x-1) + fib(x-2)").unwrap();
    assert_eq!(evaluate(&mut interp, "fib(10)").unwrap(), 55.0);
}

#[test]
fn test_for_loop_runs_body_before_testing_end() {
    let mut interp = interpreter();

    declare(&mut interp, "extern putchard(c)").unwrap();
    assert_eq!(
        evaluate(&mut interp, "for i = 65, i < 68 in putchard(i)").unwrap(),
        0.0
    );
    assert_eq!(String::from_utf8(interp.into_output()).unwrap(), "ABCD");
}

#[test]
fn test_for_loop_step() {
    let mut interp = interpreter();

    assert_eq!(
        evaluate(&mut interp, "var s = 0 in (for i = 0, i < 10, 2 in s = s + i) + s").unwrap(),
        30.0
    );
    assert_eq!(
        evaluate(&mut interp, "var s = 0 in (for i = 0, i < 10 in s = s + i) + s").unwrap(),
        55.0
    );
}

#[test]
fn test_loop_variable_is_scoped() {
    let mut interp = interpreter();

    let error = evaluate(&mut interp, "(for i = 0, i < 3 in 0) + i").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnknownVariable {
            name: String::from("i")
        }
    );
}

#[test]
fn test_var_bindings_are_sequential() {
    let mut interp = interpreter();

    assert_eq!(evaluate(&mut interp, "var a = 2, b = a * 3 in b").unwrap(), 6.0);
    assert_eq!(evaluate(&mut interp, "var a in a").unwrap(), 1.0);
    assert_eq!(evaluate(&mut interp, "var a = 1, b in a + b").unwrap(), 2.0);

    define(&mut interp, "def shadow(x) var x = x + 1 in x").unwrap();
    assert_eq!(evaluate(&mut interp, "shadow(1)").unwrap(), 2.0);
}

#[test]
fn test_assignment() {
    let mut interp = interpreter();

    define(&mut interp, "def set(x) (x = 5) + x").unwrap();
    assert_eq!(evaluate(&mut interp, "set(1)").unwrap(), 10.0);
}

#[test]
fn test_unknown_variable_rejects_definition() {
    let mut interp = interpreter();

    let error = define(&mut interp, "def f(x) y").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnknownVariable {
            name: String::from("y")
        }
    );
    assert_eq!(error.kind(), ErrorKind::Semantic);
    assert!(!interp.symbols().contains("f"));

    let error = evaluate(&mut interp, "f(1)").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnknownFunction {
            name: String::from("f")
        }
    );
}

#[test]
fn test_call_arity_mismatch() {
    let mut interp = interpreter();

    define(&mut interp, "def add(a b) a + b").unwrap();
    assert_eq!(
        evaluate(&mut interp, "add(1)").unwrap_err().get_impl(),
        &ErrorImpl::ArgumentCountMismatch {
            name: String::from("add"),
            expected: 2,
            received: 1
        }
    );
}

#[test]
fn test_redefinition() {
    let mut interp = interpreter();

    define(&mut interp, "def one() 1").unwrap();
    assert_eq!(
        define(&mut interp, "def one() 2").unwrap_err().get_impl(),
        &ErrorImpl::Redefinition {
            name: String::from("one")
        }
    );
    assert_eq!(evaluate(&mut interp, "one()").unwrap(), 1.0);
}

#[test]
fn test_unknown_operators() {
    let mut interp = interpreter();

    assert_eq!(
        evaluate(&mut interp, "!1").unwrap_err().get_impl(),
        &ErrorImpl::UnknownOperator {
            name: String::from("unary!")
        }
    );

    let or = Expr::binary('|', Expr::number(0.0), Expr::number(1.0));
    assert_eq!(
        interp.evaluate(anonymous(or)).unwrap_err().get_impl(),
        &ErrorImpl::UnknownOperator {
            name: String::from("binary|")
        }
    );
}

#[test]
fn test_user_defined_operators() {
    let mut interp = interpreter();

    let body = parse_expression(&mut parser("if lhs then 1 else if rhs then 1 else 0")).unwrap();
    interp
        .define(FunctionDef {
            proto: Prototype::binary(
                '|',
                5,
                String::from("lhs"),
                String::from("rhs"),
                Position::start(),
            ),
            body,
        })
        .unwrap();

    let or = Expr::binary('|', Expr::number(0.0), Expr::number(1.0));
    assert_eq!(interp.evaluate(anonymous(or)).unwrap(), 1.0);

    define(&mut interp, "def unary-(v) 0 - v").unwrap();
    assert_eq!(evaluate(&mut interp, "-4 + 1").unwrap(), -3.0);
}

#[test]
fn test_extern_without_body_fails_when_called() {
    let mut interp = interpreter();

    declare(&mut interp, "extern later(x)").unwrap();
    define(&mut interp, "def twice(x) later(x) * 2").unwrap();

    let error = evaluate(&mut interp, "twice(1)").unwrap_err();
    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnresolvedExternal {
            name: String::from("later")
        }
    );
    assert_eq!(error.kind(), ErrorKind::Runtime);

    define(&mut interp, "def later(x) x + 1").unwrap();
    assert_eq!(evaluate(&mut interp, "twice(3)").unwrap(), 8.0);
}

#[test]
fn test_extern_arity_must_agree() {
    let mut interp = interpreter();

    declare(&mut interp, "extern foo(x)").unwrap();
    declare(&mut interp, "extern foo(y)").unwrap();
    assert!(matches!(
        declare(&mut interp, "extern foo(x y)").unwrap_err().get_impl(),
        ErrorImpl::ArgumentCountMismatch { .. }
    ));
    assert!(matches!(
        define(&mut interp, "def foo(a b) a").unwrap_err().get_impl(),
        ErrorImpl::ArgumentCountMismatch { .. }
    ));
    assert!(matches!(
        declare(&mut interp, "extern sin(a b)").unwrap_err().get_impl(),
        ErrorImpl::ArgumentCountMismatch { .. }
    ));
}

#[test]
fn test_host_functions() {
    let mut interp = interpreter();

    declare(&mut interp, "extern sin(x)").unwrap();
    declare(&mut interp, "extern pow(x y)").unwrap();
    declare(&mut interp, "extern fmod(x y)").unwrap();
    declare(&mut interp, "extern printd(x)").unwrap();

    assert_eq!(evaluate(&mut interp, "sin(0)").unwrap(), 0.0);
    assert_eq!(evaluate(&mut interp, "pow(2, 10)").unwrap(), 1024.0);
    assert_eq!(evaluate(&mut interp, "fmod(7, 4)").unwrap(), 3.0);
    assert_eq!(evaluate(&mut interp, "printd(3.5)").unwrap(), 0.0);

    assert_eq!(
        String::from_utf8(interp.into_output()).unwrap(),
        "3.500000\n"
    );
}

#[test]
fn test_call_depth_limit() {
    let config = Config::default().with_max_call_depth(50);
    let mut interp = Interpreter::with_config(Vec::new(), &config);

    define(&mut interp, "def forever(x) forever(x)").unwrap();
    assert_eq!(
        evaluate(&mut interp, "forever(1)").unwrap_err().get_impl(),
        &ErrorImpl::CallDepthExceeded { limit: 50 }
    );

    define(&mut interp, "def down(n) if n < 1 then 0 else down(n - 1)").unwrap();
    assert_eq!(evaluate(&mut interp, "down(40)").unwrap(), 0.0);
}

#[test]
fn test_anonymous_functions_are_not_kept() {
    let mut interp = interpreter();

    assert_eq!(evaluate(&mut interp, "42").unwrap(), 42.0);
    assert!(!interp.symbols().contains("__anon_expr0"));
}

#[test]
fn test_builtin_operators() {
    for op in ['=', '+', '-', '*', '/', '<'] {
        assert!(is_builtin_binary(op));
    }
    assert!(!is_builtin_binary('>'));
    assert!(!is_builtin_binary('|'));
}

#[test]
fn test_default_call_depth_fits_main_thread_stack() {
    // Same size as a typical main thread stack.
    let handle = std::thread::Builder::new()
        .stack_size(8 * 1024 * 1024)
        .spawn(|| {
            let mut interp = Interpreter::with_config(Vec::new(), &Config::default());

            define(&mut interp, "def down(n) if n < 1 then 0 else down(n - 1)").unwrap();
            let deep = evaluate(&mut interp, "down(100000)").unwrap_err();
            let shallow = evaluate(&mut interp, "down(900)").unwrap();

            (deep.get_impl().clone(), shallow)
        })
        .unwrap();

    let (deep, shallow) = handle.join().unwrap();
    assert_eq!(
        deep,
        ErrorImpl::CallDepthExceeded {
            limit: DEFAULT_MAX_CALL_DEPTH
        }
    );
    assert_eq!(shallow, 0.0);
}
