//! Parser module for building the Abstract Syntax Tree (AST).
//!
//! A recursive-descent parser over the token stream, with precedence
//! climbing for binary operators. It handles:
//!
//! - Top-level items: definitions, externs and bare expressions
//! - Prototypes for functions and user-defined unary/binary operators
//! - Expressions: literals, variables, calls, `if`, `for`, `var`, unary and binary operators
//!
//! Binary precedences live in an `OperatorTable` that grows as operator
//! definitions are accepted, so text parsed later can use the new operators.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
