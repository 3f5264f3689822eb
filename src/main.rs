use std::io;
use std::process::ExitCode;

use ptxgen::config::Config;
use ptxgen::processor::nvvm::Library;

fn main() -> ExitCode {
    let config = Config::from_env();
    ptxgen::init_logging(&config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    ptxgen::run(std::env::args_os(), || Library::load(&config), &mut out).into()
}
