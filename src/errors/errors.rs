use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// The phase an error belongs to. The parser only ever produces `Lexical`
/// and `Syntax` errors; `Semantic` ones come from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Semantic,
    Runtime,
    Io,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::MalformedNumber { .. } | ErrorImpl::UnrecognisedCharacter { .. } => {
                ErrorKind::Lexical
            }
            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::InvalidOperatorSymbol { .. }
            | ErrorImpl::InvalidPrototype { .. }
            | ErrorImpl::OperatorArity { .. }
            | ErrorImpl::InvalidPrecedence { .. }
            | ErrorImpl::InvalidAssignment
            | ErrorImpl::NestingTooDeep { .. } => ErrorKind::Syntax,
            ErrorImpl::UnknownVariable { .. }
            | ErrorImpl::UnknownFunction { .. }
            | ErrorImpl::UnknownOperator { .. }
            | ErrorImpl::ArgumentCountMismatch { .. }
            | ErrorImpl::Redefinition { .. } => ErrorKind::Semantic,
            ErrorImpl::UnresolvedExternal { .. }
            | ErrorImpl::CallDepthExceeded { .. }
            | ErrorImpl::Codegen { .. } => ErrorKind::Runtime,
            ErrorImpl::Io { .. } => ErrorKind::Io,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::MalformedNumber { .. } => "MalformedNumber",
            ErrorImpl::UnrecognisedCharacter { .. } => "UnrecognisedCharacter",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::InvalidOperatorSymbol { .. } => "InvalidOperatorSymbol",
            ErrorImpl::InvalidPrototype { .. } => "InvalidPrototype",
            ErrorImpl::OperatorArity { .. } => "OperatorArity",
            ErrorImpl::InvalidPrecedence { .. } => "InvalidPrecedence",
            ErrorImpl::InvalidAssignment => "InvalidAssignment",
            ErrorImpl::NestingTooDeep { .. } => "NestingTooDeep",
            ErrorImpl::UnknownVariable { .. } => "UnknownVariable",
            ErrorImpl::UnknownFunction { .. } => "UnknownFunction",
            ErrorImpl::UnknownOperator { .. } => "UnknownOperator",
            ErrorImpl::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            ErrorImpl::Redefinition { .. } => "Redefinition",
            ErrorImpl::UnresolvedExternal { .. } => "UnresolvedExternal",
            ErrorImpl::CallDepthExceeded { .. } => "CallDepthExceeded",
            ErrorImpl::Codegen { .. } => "Codegen",
            ErrorImpl::Io { .. } => "Io",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::MalformedNumber { literal } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, a number may contain at most one `.`",
                literal
            )),
            ErrorImpl::UnrecognisedCharacter { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token, expected } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, expected {}",
                token, expected
            )),
            ErrorImpl::InvalidOperatorSymbol { token } => ErrorTip::Suggestion(format!(
                "`{}` cannot name an operator, use a printable symbol other than letters, digits and `()[]{{}},/\\`",
                token
            )),
            ErrorImpl::InvalidPrototype { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, a prototype starts with a name, `unary` or `binary`",
                token
            )),
            ErrorImpl::OperatorArity {
                operator,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Operator `{}` takes {} parameter(s), received {}",
                operator, expected, received
            )),
            ErrorImpl::InvalidPrecedence { token } => ErrorTip::Suggestion(format!(
                "Invalid precedence: `{}`, expected an integer literal",
                token
            )),
            ErrorImpl::InvalidAssignment => ErrorTip::Suggestion(String::from(
                "binary_op '=' needs identifier at left",
            )),
            ErrorImpl::NestingTooDeep { limit } => ErrorTip::Suggestion(format!(
                "Expression nests deeper than the limit of {}",
                limit
            )),
            ErrorImpl::UnknownVariable { name } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", name))
            }
            ErrorImpl::UnknownFunction { name } => ErrorTip::Suggestion(format!(
                "Function `{}` not declared, did you forget an `extern`?",
                name
            )),
            ErrorImpl::UnknownOperator { name } => ErrorTip::Suggestion(format!(
                "No definition for operator function `{}`",
                name
            )),
            ErrorImpl::ArgumentCountMismatch {
                name,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` expects {} arguments, received {}",
                name, expected, received
            )),
            ErrorImpl::Redefinition { name } => {
                ErrorTip::Suggestion(format!("Function `{}` already defined", name))
            }
            ErrorImpl::UnresolvedExternal { name } => ErrorTip::Suggestion(format!(
                "`{}` was declared with `extern` but never defined",
                name
            )),
            ErrorImpl::CallDepthExceeded { limit } => ErrorTip::Suggestion(format!(
                "Call depth exceeded the limit of {}, is there unbounded recursion?",
                limit
            )),
            ErrorImpl::Codegen { message } => ErrorTip::Suggestion(message.clone()),
            ErrorImpl::Io { message } => ErrorTip::Suggestion(message.clone()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.internal_error, self.position)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("malformed number: {literal:?}")]
    MalformedNumber { literal: String },
    #[error("unrecognised character: {character:?}")]
    UnrecognisedCharacter { character: char },
    #[error("unexpected token {token:?}, expected {expected}")]
    UnexpectedToken { token: String, expected: String },
    #[error("invalid operator symbol: {token:?}")]
    InvalidOperatorSymbol { token: String },
    #[error("invalid prototype starting at {token:?}")]
    InvalidPrototype { token: String },
    #[error("operator {operator:?} expects {expected} parameter(s), received {received}")]
    OperatorArity {
        operator: char,
        expected: usize,
        received: usize,
    },
    #[error("invalid operator precedence: {token:?}")]
    InvalidPrecedence { token: String },
    #[error("binary_op '=' needs identifier at left")]
    InvalidAssignment,
    #[error("expression nested deeper than {limit}")]
    NestingTooDeep { limit: usize },
    #[error("unknown variable {name:?}")]
    UnknownVariable { name: String },
    #[error("unknown function {name:?}")]
    UnknownFunction { name: String },
    #[error("unknown operator {name:?}")]
    UnknownOperator { name: String },
    #[error("{name:?} expects {expected} arguments, received {received}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("redefinition of function {name:?}")]
    Redefinition { name: String },
    #[error("unresolved external {name:?}")]
    UnresolvedExternal { name: String },
    #[error("call depth exceeded {limit}")]
    CallDepthExceeded { limit: usize },
    #[error("code generation failed: {message}")]
    Codegen { message: String },
    #[error("input error: {message}")]
    Io { message: String },
}
