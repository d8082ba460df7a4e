//! Tree-walking reference backend.
//!
//! Every value is an `f64`. Variables live in a flat environment per call,
//! innermost binding last; `for` and `var` push bindings and pop them when
//! their scope ends.

use std::{io::Write, rc::Rc};

use crate::{
    ast::{
        ast::Expr,
        statements::{binary_function_name, unary_function_name, FunctionDef, Prototype},
    },
    config::Config,
    errors::errors::{Error, ErrorImpl},
    Position, MK_ERROR,
};

use super::{
    check::check_function,
    natives::{self, Native},
    symbols::{Function, SymbolTable},
    Backend,
};

type Environment = Vec<(String, f64)>;

enum Callee {
    Body(Rc<FunctionDef>),
    Native(Native),
}

pub struct Interpreter<W> {
    symbols: SymbolTable,
    /// Sink for `putchard` and `printd`
    output: W,
    max_call_depth: usize,
    depth: usize,
    /// Where the unit being run was defined, for runtime errors
    position: Position,
}

impl<W: Write> Interpreter<W> {
    pub fn new(output: W) -> Self {
        Interpreter::with_config(output, &Config::default())
    }

    pub fn with_config(output: W, config: &Config) -> Self {
        Interpreter {
            symbols: SymbolTable::new(),
            output,
            max_call_depth: config.max_call_depth,
            depth: 0,
            position: Position::start(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn error(&self, error: ErrorImpl) -> Error {
        MK_ERROR!(error, self.position)
    }

    fn call(&mut self, name: &str, args: Vec<f64>) -> Result<f64, Error> {
        let callee = match self.symbols.get(name) {
            Some(Function::Defined(def)) => Callee::Body(Rc::clone(def)),
            Some(Function::Extern(_)) => Callee::Native(natives::lookup(name).ok_or_else(|| {
                self.error(ErrorImpl::UnresolvedExternal {
                    name: String::from(name),
                })
            })?),
            None => {
                return Err(self.error(ErrorImpl::UnknownFunction {
                    name: String::from(name),
                }))
            }
        };

        match callee {
            Callee::Body(def) => {
                if self.depth >= self.max_call_depth {
                    return Err(self.error(ErrorImpl::CallDepthExceeded {
                        limit: self.max_call_depth,
                    }));
                }

                let mut env: Environment = def.proto.params.iter().cloned().zip(args).collect();

                self.depth += 1;
                let result = self.eval(&def.body, &mut env);
                self.depth -= 1;

                result
            }
            Callee::Native(native) => self.call_native(native, &args),
        }
    }

    fn call_native(&mut self, native: Native, args: &[f64]) -> Result<f64, Error> {
        match (native, args) {
            (Native::Putchard, [x]) => {
                self.write(&[*x as u8])?;
                Ok(0.0)
            }
            (Native::Printd, [x]) => {
                self.write(natives::format_printd(*x).as_bytes())?;
                Ok(0.0)
            }
            (Native::Unary(function), [x]) => Ok(function(*x)),
            (Native::Binary(function), [x, y]) => Ok(function(*x, *y)),
            _ => Err(self.error(ErrorImpl::Codegen {
                message: format!("host function called with {} arguments", args.len()),
            })),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.output
            .write_all(bytes)
            .and_then(|_| self.output.flush())
            .map_err(|error| {
                MK_ERROR!(
                    ErrorImpl::Io {
                        message: error.to_string()
                    },
                    self.position
                )
            })
    }

    fn eval(&mut self, expr: &Expr, env: &mut Environment) -> Result<f64, Error> {
        match expr {
            Expr::Number(value) => Ok(*value),
            Expr::Variable(name) => lookup(env, name)
                .map(|slot| env[slot].1)
                .ok_or_else(|| self.error(ErrorImpl::UnknownVariable { name: name.clone() })),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand, env)?;
                self.call(&unary_function_name(*op), vec![value])
            }
            Expr::Binary { op: '=', lhs, rhs } => {
                let Expr::Variable(name) = lhs.as_ref() else {
                    return Err(self.error(ErrorImpl::InvalidAssignment));
                };

                let value = self.eval(rhs, env)?;
                let slot = lookup(env, name)
                    .ok_or_else(|| self.error(ErrorImpl::UnknownVariable { name: name.clone() }))?;
                env[slot].1 = value;

                Ok(value)
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs, env)?;
                let rhs = self.eval(rhs, env)?;

                match op {
                    '+' => Ok(lhs + rhs),
                    '-' => Ok(lhs - rhs),
                    '*' => Ok(lhs * rhs),
                    '/' => Ok(lhs / rhs),
                    // Unordered: NaN on either side compares as less.
                    '<' => Ok(if lhs >= rhs { 0.0 } else { 1.0 }),
                    _ => self.call(&binary_function_name(*op), vec![lhs, rhs]),
                }
            }
            Expr::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, env))
                    .collect::<Result<Vec<f64>, Error>>()?;

                self.call(callee, args)
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if is_true(self.eval(cond, env)?) {
                    self.eval(then_branch, env)
                } else {
                    self.eval(else_branch, env)
                }
            }
            Expr::For {
                var,
                start,
                end,
                step,
                body,
            } => {
                let start = self.eval(start, env)?;

                env.push((var.clone(), start));
                let slot = env.len() - 1;
                let result = self.run_loop(slot, end, step.as_deref(), body, env);
                env.truncate(slot);

                result
            }
            Expr::Var { bindings, body } => {
                let depth = env.len();
                let result = self.eval_var(bindings, body, env);
                env.truncate(depth);

                result
            }
        }
    }

    /// Body, step, end condition, increment; repeats while the end
    /// condition held. Always yields 0.0.
    fn run_loop(
        &mut self,
        slot: usize,
        end: &Expr,
        step: Option<&Expr>,
        body: &Expr,
        env: &mut Environment,
    ) -> Result<f64, Error> {
        loop {
            self.eval(body, env)?;

            let step = match step {
                Some(step) => self.eval(step, env)?,
                None => 1.0,
            };
            let end = self.eval(end, env)?;

            env[slot].1 += step;

            if !is_true(end) {
                return Ok(0.0);
            }
        }
    }

    fn eval_var(
        &mut self,
        bindings: &[(String, Option<Expr>)],
        body: &Expr,
        env: &mut Environment,
    ) -> Result<f64, Error> {
        for (name, init) in bindings {
            let value = match init {
                Some(init) => self.eval(init, env)?,
                None => 1.0,
            };
            env.push((name.clone(), value));
        }

        self.eval(body, env)
    }
}

impl<W: Write> Backend for Interpreter<W> {
    fn declare(&mut self, proto: Prototype) -> Result<(), Error> {
        tracing::debug!(name = %proto.name, arity = proto.arity(), "extern declared");
        self.symbols.declare(proto)
    }

    fn define(&mut self, def: FunctionDef) -> Result<(), Error> {
        self.symbols.check_definable(&def)?;
        check_function(&self.symbols, &def)?;

        tracing::debug!(name = %def.proto.name, "function defined");
        self.symbols.insert_definition(def);
        Ok(())
    }

    fn evaluate(&mut self, def: FunctionDef) -> Result<f64, Error> {
        check_function(&self.symbols, &def)?;

        self.position = def.proto.position;
        self.depth = 0;

        let mut env = Environment::new();
        self.eval(&def.body, &mut env)
    }
}

/// Innermost binding of `name`.
fn lookup(env: &Environment, name: &str) -> Option<usize> {
    env.iter().rposition(|(var, _)| var == name)
}

/// Ordered not-equal to zero; NaN is false.
fn is_true(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}
