//! Backends consume completed units from the driver.
//!
//! A backend validates what it is handed (unknown names, arity, redefinition)
//! and either keeps it or rejects it. Rejection is never fatal to a session.
//!
//! - `interpreter`: tree-walking evaluator, always available.
//! - `jit`: LLVM JIT through inkwell, behind the `jit` feature.

use crate::{
    ast::statements::{FunctionDef, Prototype},
    errors::errors::Error,
};

pub mod check;
pub mod interpreter;
#[cfg(feature = "jit")]
pub mod jit;
pub mod natives;
pub mod symbols;

#[cfg(test)]
mod tests;

pub trait Backend {
    /// Registers an `extern` prototype.
    fn declare(&mut self, proto: Prototype) -> Result<(), Error>;

    /// Validates and keeps a named definition.
    fn define(&mut self, def: FunctionDef) -> Result<(), Error>;

    /// Validates and runs an anonymous top-level wrapper, returning its value.
    /// The wrapper is not kept.
    fn evaluate(&mut self, def: FunctionDef) -> Result<f64, Error>;
}
