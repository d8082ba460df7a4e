//! LLVM JIT backend.
//!
//! Definitions are checked and kept as syntax trees. Each top-level
//! expression is compiled into a fresh module together with every function
//! it reaches, handed to an MCJIT execution engine, and called natively.

use std::{fmt::Display, io::Write, rc::Rc};

use inkwell::{
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    execution_engine::{ExecutionEngine, JitFunction},
    module::Module,
    targets::{InitializationConfig, Target},
    types::BasicMetadataTypeEnum,
    values::{BasicMetadataValueEnum, FloatValue, FunctionValue, IntValue, PointerValue},
    FloatPredicate, OptimizationLevel,
};

use crate::{
    ast::{
        ast::Expr,
        statements::{binary_function_name, unary_function_name, FunctionDef, Prototype},
    },
    errors::errors::{Error, ErrorImpl},
    Position, MK_ERROR,
};

use super::{
    check::check_function,
    natives::{self, format_printd, Native},
    symbols::{Function, SymbolTable},
    Backend,
};

type TopLevelFn = unsafe extern "C" fn() -> f64;

extern "C" fn putchard(x: f64) -> f64 {
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(&[x as u8]).and_then(|_| stdout.flush());
    0.0
}

extern "C" fn printd(x: f64) -> f64 {
    let mut stdout = std::io::stdout();
    let _ = stdout
        .write_all(format_printd(x).as_bytes())
        .and_then(|_| stdout.flush());
    0.0
}

fn native_address(native: Native) -> usize {
    match native {
        Native::Putchard => putchard as usize,
        Native::Printd => printd as usize,
        Native::Unary(function) => function as usize,
        Native::Binary(function) => function as usize,
    }
}

pub struct Jit<'ctx> {
    context: &'ctx Context,
    symbols: SymbolTable,
}

impl<'ctx> Jit<'ctx> {
    pub fn new(context: &'ctx Context) -> Result<Self, Error> {
        Target::initialize_native(&InitializationConfig::default())
            .map_err(|message| MK_ERROR!(ErrorImpl::Codegen { message }, Position::start()))?;

        Ok(Jit {
            context,
            symbols: SymbolTable::new(),
        })
    }
}

impl<'ctx> Backend for Jit<'ctx> {
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

        let position = def.proto.position;
        let codegen_error = |message: String| MK_ERROR!(ErrorImpl::Codegen { message }, position);

        let module = self.context.create_module(&def.proto.name);
        let engine = module
            .create_jit_execution_engine(OptimizationLevel::None)
            .map_err(|message| codegen_error(message.to_string()))?;

        let mut codegen = Codegen {
            context: self.context,
            module: &module,
            engine: &engine,
            builder: self.context.create_builder(),
            symbols: &self.symbols,
            variables: vec![],
            pending: vec![],
            position,
        };
        codegen.compile(&def)?;

        module
            .verify()
            .map_err(|message| codegen_error(message.to_string()))?;
        tracing::trace!("{}", module.print_to_string().to_string());

        let function: JitFunction<TopLevelFn> = unsafe { engine.get_function(&def.proto.name) }
            .map_err(|error| codegen_error(format!("{:?}", error)))?;

        Ok(unsafe { function.call() })
    }
}

/// Code generation state for one module.
struct Codegen<'a, 'ctx> {
    context: &'ctx Context,
    module: &'a Module<'ctx>,
    engine: &'a ExecutionEngine<'ctx>,
    builder: Builder<'ctx>,
    symbols: &'a SymbolTable,
    /// Stack slots of visible variables, innermost last
    variables: Vec<(String, PointerValue<'ctx>)>,
    /// Definitions declared in the module but not compiled yet
    pending: Vec<Rc<FunctionDef>>,
    position: Position,
}

impl<'a, 'ctx> Codegen<'a, 'ctx> {
    fn error(&self, error: impl Display) -> Error {
        MK_ERROR!(
            ErrorImpl::Codegen {
                message: error.to_string()
            },
            self.position
        )
    }

    /// Compiles `def` and everything it calls.
    fn compile(&mut self, def: &FunctionDef) -> Result<(), Error> {
        let function = self.declare_function(&def.proto);
        self.compile_body(function, def)?;

        while let Some(def) = self.pending.pop() {
            let function = self
                .module
                .get_function(&def.proto.name)
                .ok_or_else(|| self.error(format!("`{}` vanished from the module", def.proto.name)))?;
            self.compile_body(function, &def)?;
        }

        Ok(())
    }

    fn declare_function(&self, proto: &Prototype) -> FunctionValue<'ctx> {
        let f64_type = self.context.f64_type();
        let params: Vec<BasicMetadataTypeEnum> = vec![f64_type.into(); proto.arity()];
        let function = self
            .module
            .add_function(&proto.name, f64_type.fn_type(&params, false), None);

        for (param, name) in function.get_param_iter().zip(&proto.params) {
            param.into_float_value().set_name(name);
        }

        function
    }

    /// Returns the module's declaration of `name`, adding it on first use.
    fn get_function(&mut self, name: &str) -> Result<FunctionValue<'ctx>, Error> {
        if let Some(function) = self.module.get_function(name) {
            return Ok(function);
        }

        let symbols = self.symbols;
        match symbols.get(name) {
            Some(Function::Defined(def)) => {
                let function = self.declare_function(&def.proto);
                self.pending.push(Rc::clone(def));
                Ok(function)
            }
            Some(Function::Extern(proto)) => {
                let native = natives::lookup(name).ok_or_else(|| {
                    MK_ERROR!(
                        ErrorImpl::UnresolvedExternal {
                            name: String::from(name)
                        },
                        self.position
                    )
                })?;

                let function = self.declare_function(proto);
                self.engine
                    .add_global_mapping(&function, native_address(native));
                Ok(function)
            }
            None => Err(MK_ERROR!(
                ErrorImpl::UnknownFunction {
                    name: String::from(name)
                },
                self.position
            )),
        }
    }

    fn compile_body(&mut self, function: FunctionValue<'ctx>, def: &FunctionDef) -> Result<(), Error> {
        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        self.variables.clear();
        for (param, name) in function.get_param_iter().zip(&def.proto.params) {
            let alloca = self.create_entry_alloca(function, name)?;
            self.builder
                .build_store(alloca, param)
                .map_err(|error| self.error(error))?;
            self.variables.push((name.clone(), alloca));
        }

        let body = self.gen_expr(&def.body)?;
        self.builder
            .build_return(Some(&body))
            .map_err(|error| self.error(error))?;

        if function.verify(false) {
            Ok(())
        } else {
            Err(self.error(format!("invalid function generated for `{}`", def.proto.name)))
        }
    }

    /// Adds a stack slot at the top of the entry block.
    fn create_entry_alloca(&self, function: FunctionValue<'ctx>, name: &str) -> Result<PointerValue<'ctx>, Error> {
        let builder = self.context.create_builder();
        let entry = function
            .get_first_basic_block()
            .ok_or_else(|| self.error("function has no entry block"))?;

        match entry.get_first_instruction() {
            Some(instruction) => builder.position_before(&instruction),
            None => builder.position_at_end(entry),
        }

        builder
            .build_alloca(self.context.f64_type(), name)
            .map_err(|error| self.error(error))
    }

    fn current_function(&self) -> Result<FunctionValue<'ctx>, Error> {
        self.builder
            .get_insert_block()
            .and_then(|block| block.get_parent())
            .ok_or_else(|| self.error("builder is not inside a function"))
    }

    fn variable(&self, name: &str) -> Result<PointerValue<'ctx>, Error> {
        self.variables
            .iter()
            .rev()
            .find(|(var, _)| var == name)
            .map(|(_, alloca)| *alloca)
            .ok_or_else(|| {
                MK_ERROR!(
                    ErrorImpl::UnknownVariable {
                        name: String::from(name)
                    },
                    self.position
                )
            })
    }

    fn call(&mut self, name: &str, args: &[FloatValue<'ctx>]) -> Result<FloatValue<'ctx>, Error> {
        let function = self.get_function(name)?;
        let args: Vec<BasicMetadataValueEnum> = args.iter().map(|arg| (*arg).into()).collect();

        self.builder
            .build_call(function, &args, "calltmp")
            .map_err(|error| self.error(error))?
            .try_as_basic_value()
            .left()
            .map(|value| value.into_float_value())
            .ok_or_else(|| self.error(format!("`{}` returned no value", name)))
    }

    fn truth(&self, value: FloatValue<'ctx>, name: &str) -> Result<IntValue<'ctx>, Error> {
        let zero = self.context.f64_type().const_float(0.0);
        self.builder
            .build_float_compare(FloatPredicate::ONE, value, zero, name)
            .map_err(|error| self.error(error))
    }

    fn branch(&self, block: BasicBlock<'ctx>) -> Result<(), Error> {
        self.builder
            .build_unconditional_branch(block)
            .map(|_| ())
            .map_err(|error| self.error(error))
    }

    fn gen_expr(&mut self, expr: &Expr) -> Result<FloatValue<'ctx>, Error> {
        let f64_type = self.context.f64_type();

        match expr {
            Expr::Number(value) => Ok(f64_type.const_float(*value)),
            Expr::Variable(name) => {
                let alloca = self.variable(name)?;
                self.builder
                    .build_load(alloca, name)
                    .map(|value| value.into_float_value())
                    .map_err(|error| self.error(error))
            }
            Expr::Unary { op, operand } => {
                let operand = self.gen_expr(operand)?;
                self.call(&unary_function_name(*op), &[operand])
            }
            Expr::Binary { op: '=', lhs, rhs } => {
                let Expr::Variable(name) = lhs.as_ref() else {
                    return Err(MK_ERROR!(ErrorImpl::InvalidAssignment, self.position));
                };

                let value = self.gen_expr(rhs)?;
                let alloca = self.variable(name)?;
                self.builder
                    .build_store(alloca, value)
                    .map_err(|error| self.error(error))?;

                Ok(value)
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.gen_expr(lhs)?;
                let rhs = self.gen_expr(rhs)?;

                let result = match op {
                    '+' => self.builder.build_float_add(lhs, rhs, "addtmp"),
                    '-' => self.builder.build_float_sub(lhs, rhs, "subtmp"),
                    '*' => self.builder.build_float_mul(lhs, rhs, "multmp"),
                    '/' => self.builder.build_float_div(lhs, rhs, "divtmp"),
                    '<' => {
                        let cmp = self
                            .builder
                            .build_float_compare(FloatPredicate::ULT, lhs, rhs, "cmptmp")
                            .map_err(|error| self.error(error))?;
                        self.builder
                            .build_unsigned_int_to_float(cmp, f64_type, "booltmp")
                    }
                    _ => return self.call(&binary_function_name(*op), &[lhs, rhs]),
                };

                result.map_err(|error| self.error(error))
            }
            Expr::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.gen_expr(arg))
                    .collect::<Result<Vec<_>, Error>>()?;

                self.call(callee, &args)
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.gen_expr(cond)?;
                let cond = self.truth(cond, "ifcond")?;

                let function = self.current_function()?;
                let then_block = self.context.append_basic_block(function, "then");
                let else_block = self.context.append_basic_block(function, "else");
                let merge_block = self.context.append_basic_block(function, "ifcont");

                self.builder
                    .build_conditional_branch(cond, then_block, else_block)
                    .map_err(|error| self.error(error))?;

                self.builder.position_at_end(then_block);
                let then_value = self.gen_expr(then_branch)?;
                self.branch(merge_block)?;
                let then_end = self.builder.get_insert_block().unwrap_or(then_block);

                self.builder.position_at_end(else_block);
                let else_value = self.gen_expr(else_branch)?;
                self.branch(merge_block)?;
                let else_end = self.builder.get_insert_block().unwrap_or(else_block);

                self.builder.position_at_end(merge_block);
                let phi = self
                    .builder
                    .build_phi(f64_type, "iftmp")
                    .map_err(|error| self.error(error))?;
                phi.add_incoming(&[(&then_value, then_end), (&else_value, else_end)]);

                Ok(phi.as_basic_value().into_float_value())
            }
            Expr::For {
                var,
                start,
                end,
                step,
                body,
            } => {
                let function = self.current_function()?;
                let alloca = self.create_entry_alloca(function, var)?;

                let start = self.gen_expr(start)?;
                self.builder
                    .build_store(alloca, start)
                    .map_err(|error| self.error(error))?;

                let loop_block = self.context.append_basic_block(function, "loop");
                self.branch(loop_block)?;
                self.builder.position_at_end(loop_block);

                self.variables.push((var.clone(), alloca));
                let result = self.gen_loop(function, alloca, loop_block, end, step.as_deref(), body);
                self.variables.pop();
                result?;

                Ok(f64_type.const_float(0.0))
            }
            Expr::Var { bindings, body } => {
                let depth = self.variables.len();
                let result = self.gen_var(bindings, body);
                self.variables.truncate(depth);

                result
            }
        }
    }

    fn gen_loop(
        &mut self,
        function: FunctionValue<'ctx>,
        alloca: PointerValue<'ctx>,
        loop_block: BasicBlock<'ctx>,
        end: &Expr,
        step: Option<&Expr>,
        body: &Expr,
    ) -> Result<(), Error> {
        self.gen_expr(body)?;

        let step = match step {
            Some(step) => self.gen_expr(step)?,
            None => self.context.f64_type().const_float(1.0),
        };
        let end = self.gen_expr(end)?;
        let end = self.truth(end, "loopcond")?;

        let current = self
            .builder
            .build_load(alloca, "curvar")
            .map_err(|error| self.error(error))?
            .into_float_value();
        let next = self
            .builder
            .build_float_add(current, step, "nextvar")
            .map_err(|error| self.error(error))?;
        self.builder
            .build_store(alloca, next)
            .map_err(|error| self.error(error))?;

        let after_block = self.context.append_basic_block(function, "afterloop");
        self.builder
            .build_conditional_branch(end, loop_block, after_block)
            .map_err(|error| self.error(error))?;
        self.builder.position_at_end(after_block);

        Ok(())
    }

    fn gen_var(&mut self, bindings: &[(String, Option<Expr>)], body: &Expr) -> Result<FloatValue<'ctx>, Error> {
        let function = self.current_function()?;

        for (name, init) in bindings {
            let value = match init {
                Some(init) => self.gen_expr(init)?,
                None => self.context.f64_type().const_float(1.0),
            };

            let alloca = self.create_entry_alloca(function, name)?;
            self.builder
                .build_store(alloca, value)
                .map_err(|error| self.error(error))?;
            self.variables.push((name.clone(), alloca));
        }

        self.gen_expr(body)
    }
}
