use std::fmt::{Display, Formatter, Result};

use crate::Position;

use super::ast::Expr;

pub const UNARY_PREFIX: &str = "unary";
pub const BINARY_PREFIX: &str = "binary";
pub const ANONYMOUS_PREFIX: &str = "__anon_expr";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrototypeKind {
    Function,
    UnaryOp,
    BinaryOp { precedence: i32 },
}

/// Signature of a function or operator.
///
/// Operator prototypes are named after the symbol they define: `unary!`,
/// `binary>`. Unary operators take exactly one parameter, binary exactly two.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<String>,
    pub kind: PrototypeKind,
    pub position: Position,
}

impl Prototype {
    pub fn function(name: &str, params: Vec<String>, position: Position) -> Self {
        Prototype {
            name: String::from(name),
            params,
            kind: PrototypeKind::Function,
            position,
        }
    }

    pub fn unary(op: char, param: String, position: Position) -> Self {
        Prototype {
            name: unary_function_name(op),
            params: vec![param],
            kind: PrototypeKind::UnaryOp,
            position,
        }
    }

    pub fn binary(op: char, precedence: i32, lhs: String, rhs: String, position: Position) -> Self {
        Prototype {
            name: binary_function_name(op),
            params: vec![lhs, rhs],
            kind: PrototypeKind::BinaryOp { precedence },
            position,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn is_operator(&self) -> bool {
        !matches!(self.kind, PrototypeKind::Function)
    }

    /// The symbol of an operator prototype, `None` for plain functions.
    pub fn operator_symbol(&self) -> Option<char> {
        if self.is_operator() {
            self.name.chars().last()
        } else {
            None
        }
    }

    pub fn precedence(&self) -> Option<i32> {
        match self.kind {
            PrototypeKind::BinaryOp { precedence } => Some(precedence),
            _ => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.starts_with(ANONYMOUS_PREFIX)
    }
}

impl Display for Prototype {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{} ({})", self.name, self.params.join(" "))?;
        if let PrototypeKind::BinaryOp { precedence } = self.kind {
            write!(f, " [{}]", precedence)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub proto: Prototype,
    pub body: Expr,
}

impl Display for FunctionDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "(def {} {})", self.proto, self.body)
    }
}

/// Name of a unary operator function for `op`.
pub fn unary_function_name(op: char) -> String {
    format!("{}{}", UNARY_PREFIX, op)
}

/// Name of a binary operator function for `op`.
pub fn binary_function_name(op: char) -> String {
    format!("{}{}", BINARY_PREFIX, op)
}
