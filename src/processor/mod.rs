//! Drives a compiler program: add modules, verify, compile.
pub mod nvvm;

use log::info;

use crate::error::Result;
use crate::model::InputModule;

/// Something that can open compilation sessions.
pub trait Compiler {
    type Program: Program;

    fn create_program(&self) -> Result<Self::Program>;
}

/// A single compilation session. Modules are linked in the order added.
pub trait Program {
    fn add_module(&mut self, module: &InputModule) -> Result<()>;
    fn verify(&mut self) -> Result<()>;
    fn compile(&mut self, options: &[String]) -> Result<String>;
}

/// Feed every module into a fresh program, verify it and compile it.
///
/// Modules are pulled one at a time and added as soon as they are read; the
/// first error (read or library) ends the run.
pub fn run<C, I>(compiler: &C, modules: I, options: &[String]) -> Result<String>
where
    C: Compiler,
    I: IntoIterator<Item = Result<InputModule>>,
{
    let mut program = compiler.create_program()?;

    let mut count = 0usize;
    for module in modules {
        let module = module?;
        info!("adding module {} ({} bytes)", module.name, module.bytes.len());
        program.add_module(&module)?;
        count += 1;
    }

    info!("verifying {count} module(s)");
    program.verify()?;

    info!("compiling with {options:?}");
    let ptx = program.compile(options)?;
    info!("compiled {} bytes of PTX", ptx.len());

    Ok(ptx)
}
