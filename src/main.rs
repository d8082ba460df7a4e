//! Kaleidoscope - CLI

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    thread,
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use kaleidoscope::{
    backend::{interpreter::Interpreter, Backend},
    config::{Config, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_DEPTH},
    display_error,
    driver::driver::{Driver, Outcome},
    logger::{self, LogLevel},
};

/// Deep recursion in user programs runs on the session thread's stack.
const SESSION_STACK_SIZE: usize = 256 * 1024 * 1024;

/// Kaleidoscope with user-defined operators
#[derive(Parser, Debug)]
#[command(name = "kaleidoscope")]
#[command(version)]
#[command(long_about = None)]
struct Args {
    /// Source file to run; reads standard input when absent
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Deepest expression nesting the parser accepts
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Deepest call nesting the interpreter evaluates
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Log every parsed item as an s-expression
    #[arg(long)]
    dump_ast: bool,

    /// trace, debug, info, warn or error
    #[arg(long, default_value = "warn")]
    log_level: LogLevel,

    #[arg(long, value_enum, default_value_t = BackendKind::Interp)]
    backend: BackendKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    /// Tree-walking interpreter
    Interp,
    /// LLVM JIT, needs a build with `--features jit`
    Jit,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::default()
        .with_max_depth(args.max_depth)
        .with_max_call_depth(args.max_call_depth)
        .with_dump_ast(args.dump_ast)
        .with_log_level(args.log_level);

    logger::init_with_level(config.effective_log_level());

    thread::Builder::new()
        .name(String::from("session"))
        .stack_size(SESSION_STACK_SIZE)
        .spawn(move || run(args.file, args.backend, config))
        .context("Failed to start the session thread")?
        .join()
        .map_err(|_| anyhow!("The session thread panicked"))?
}

fn run(file: Option<PathBuf>, backend: BackendKind, config: Config) -> Result<()> {
    match file {
        Some(path) => {
            let reader = BufReader::new(
                File::open(&path).with_context(|| format!("Failed to open: {}", path.display()))?,
            );
            session(reader, Some(&path), backend, config)
        }
        None => session(io::stdin().lock(), None, backend, config),
    }
}

fn session<R: BufRead>(reader: R, file: Option<&Path>, backend: BackendKind, config: Config) -> Result<()> {
    match backend {
        BackendKind::Interp => {
            let interpreter = Interpreter::with_config(io::stdout(), &config);
            drive(Driver::new(reader, interpreter, config), file);
            Ok(())
        }
        BackendKind::Jit => jit_session(reader, file, config),
    }
}

#[cfg(feature = "jit")]
fn jit_session<R: BufRead>(reader: R, file: Option<&Path>, config: Config) -> Result<()> {
    let context = inkwell::context::Context::create();
    let jit = kaleidoscope::backend::jit::Jit::new(&context)?;

    drive(Driver::new(reader, jit, config), file);
    Ok(())
}

#[cfg(not(feature = "jit"))]
fn jit_session<R: BufRead>(_reader: R, _file: Option<&Path>, _config: Config) -> Result<()> {
    anyhow::bail!("This build has no JIT backend, rebuild with `--features jit`")
}

fn drive<R: BufRead, B: Backend>(mut driver: Driver<R, B>, file: Option<&Path>) {
    while let Some(outcome) = driver.next_item() {
        match outcome {
            Outcome::Evaluated { value } => println!("Evaluated to {:.6}", value),
            Outcome::Failed(error) => display_error(&error, file),
            Outcome::Defined { .. } | Outcome::Declared { .. } => {}
        }
    }
}
