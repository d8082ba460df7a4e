//! Definition-time checks shared by every backend.
//!
//! The parser accepts any identifier and any prefix operator; this pass
//! resolves them against the session's functions before a body is kept or run.

use crate::{
    ast::{
        ast::Expr,
        statements::{binary_function_name, unary_function_name, FunctionDef, Prototype},
    },
    errors::errors::{Error, ErrorImpl},
    MK_ERROR,
};

use super::symbols::SymbolTable;

/// Operators the backends implement directly.
pub const BUILTIN_BINARY_OPERATORS: [char; 6] = ['=', '+', '-', '*', '/', '<'];

pub fn is_builtin_binary(op: char) -> bool {
    BUILTIN_BINARY_OPERATORS.contains(&op)
}

/// Checks every name and call in `def.body`. `def` itself is visible, so
/// recursion resolves.
pub fn check_function(symbols: &SymbolTable, def: &FunctionDef) -> Result<(), Error> {
    let mut checker = Checker {
        symbols,
        current: &def.proto,
        scope: def.proto.params.iter().map(String::as_str).collect(),
    };

    checker.check_expr(&def.body)
}

struct Checker<'a> {
    symbols: &'a SymbolTable,
    current: &'a Prototype,
    /// Visible variables, innermost last.
    scope: Vec<&'a str>,
}

impl<'a> Checker<'a> {
    fn arity_of(&self, name: &str) -> Option<usize> {
        if name == self.current.name {
            Some(self.current.arity())
        } else {
            self.symbols.arity_of(name)
        }
    }

    fn error(&self, error: ErrorImpl) -> Error {
        MK_ERROR!(error, self.current.position)
    }

    fn check_expr(&mut self, expr: &'a Expr) -> Result<(), Error> {
        match expr {
            Expr::Number(_) => Ok(()),
            Expr::Variable(name) => {
                if self.scope.iter().any(|var| *var == name.as_str()) {
                    Ok(())
                } else {
                    Err(self.error(ErrorImpl::UnknownVariable { name: name.clone() }))
                }
            }
            Expr::Unary { op, operand } => {
                self.check_operator(unary_function_name(*op), 1)?;
                self.check_expr(operand)
            }
            Expr::Binary { op, lhs, rhs } => {
                if !is_builtin_binary(*op) {
                    self.check_operator(binary_function_name(*op), 2)?;
                }
                self.check_expr(lhs)?;
                self.check_expr(rhs)
            }
            Expr::Call { callee, args } => {
                let expected = self.arity_of(callee).ok_or_else(|| {
                    self.error(ErrorImpl::UnknownFunction {
                        name: callee.clone(),
                    })
                })?;

                if expected != args.len() {
                    return Err(self.error(ErrorImpl::ArgumentCountMismatch {
                        name: callee.clone(),
                        expected,
                        received: args.len(),
                    }));
                }

                args.iter().try_for_each(|arg| self.check_expr(arg))
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.check_expr(cond)?;
                self.check_expr(then_branch)?;
                self.check_expr(else_branch)
            }
            Expr::For {
                var,
                start,
                end,
                step,
                body,
            } => {
                self.check_expr(start)?;

                self.scope.push(var);
                let result = self.check_loop(end, step.as_deref(), body);
                self.scope.pop();

                result
            }
            Expr::Var { bindings, body } => {
                let depth = self.scope.len();
                let result = self.check_bindings(bindings, body);
                self.scope.truncate(depth);

                result
            }
        }
    }

    fn check_loop(&mut self, end: &'a Expr, step: Option<&'a Expr>, body: &'a Expr) -> Result<(), Error> {
        self.check_expr(body)?;
        if let Some(step) = step {
            self.check_expr(step)?;
        }
        self.check_expr(end)
    }

    /// Each initializer sees the bindings before it, not its own name.
    fn check_bindings(&mut self, bindings: &'a [(String, Option<Expr>)], body: &'a Expr) -> Result<(), Error> {
        for (name, init) in bindings {
            if let Some(init) = init {
                self.check_expr(init)?;
            }
            self.scope.push(name);
        }

        self.check_expr(body)
    }

    fn check_operator(&self, name: String, arity: usize) -> Result<(), Error> {
        match self.arity_of(&name) {
            Some(found) if found == arity => Ok(()),
            _ => Err(self.error(ErrorImpl::UnknownOperator { name })),
        }
    }
}
