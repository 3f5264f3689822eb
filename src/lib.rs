pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod writer;

pub use error::{Error, Result};

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use log::warn;

use crate::config::Config;
use crate::model::CompileRequest;
use crate::processor::Compiler;

/// How a run ended. Converts into the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// Nothing to compile was given.
    Usage,
    /// An input could not be read, or libNVVM failed to load, verify or compile.
    Failed,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::Usage => 1,
            Status::Failed => 2,
        }
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}

/// Install the stderr logger using the configured filter.
pub fn init_logging(config: &Config) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&config.log_filter);
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

/// The whole driver.
///
/// `argv` includes the program name. `connect` is only called once the
/// command line is known to name something to compile, so a usage error never
/// needs the native library.
pub fn run<A, T, F, C, W>(argv: A, connect: F, out: &mut W) -> Status
where
    A: IntoIterator<Item = T>,
    T: Into<OsString>,
    F: FnOnce() -> Result<C>,
    C: Compiler,
    W: Write,
{
    // 1. ── Parse ──────────────────────────────────────────────────────
    let cli = cli::Cli::from_args_os(argv);
    let request = match parser::classify(&cli.program, cli.args) {
        Ok(request) => request,
        Err(e) => {
            report(writer::stdout::emit_usage(out, &e));
            return Status::Usage;
        }
    };

    // 2. ── Process ────────────────────────────────────────────────────
    let ptx = match compile(&request, connect) {
        Ok(ptx) => ptx,
        Err(e) => {
            warn!("{e:#}");
            report(writer::stdout::emit_error(out, &e));
            return Status::Failed;
        }
    };

    // 3. ── Write output ───────────────────────────────────────────────
    match writer::stdout::emit(out, &ptx) {
        Ok(()) => Status::Success,
        Err(e) => {
            warn!("writing PTX: {e}");
            Status::Failed
        }
    }
}

/// Load the compiler, then read, verify and compile every input of `request`.
pub fn compile<F, C>(request: &CompileRequest, connect: F) -> anyhow::Result<String>
where
    F: FnOnce() -> Result<C>,
    C: Compiler,
{
    let compiler = connect()?;
    let modules = parser::loader::modules(&request.inputs);

    let ptx = processor::run(&compiler, modules, &request.options)
        .with_context(|| format!("compiling {} input(s)", request.inputs.len()))?;
    Ok(ptx)
}

fn report(res: std::io::Result<()>) {
    if let Err(e) = res {
        warn!("writing to stdout: {e}");
    }
}
