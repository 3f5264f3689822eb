use std::ffi::OsString;
use std::path::Path;

use clap::{CommandFactory, Parser};

const USAGE_ARGS: &str = "[options] ir-file-1 [ir-file-2 [ir-file-3 ...]]";

// The wrapper owns no flags: every token, `-h` and `--` included, belongs to
// libNVVM or names an input file. clap only describes the command and renders
// its usage line; the tokens themselves never go through clap's parser.
#[derive(Parser, Debug)]
#[command(name = "ptxgen", about, disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Basename of `argv[0]`.
    #[arg(skip)]
    pub program: String,
    /// libNVVM options (anything starting with `-`) and IR input files
    #[arg(num_args = 0.., allow_hyphen_values = true)]
    pub args: Vec<OsString>,
}

impl Cli {
    /// Split a full argument vector into the program name and the raw tokens.
    pub fn from_args_os<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv
            .next()
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "ptxgen".to_string());

        Self {
            program,
            args: argv.collect(),
        }
    }
}

/// `Usage: <program> [options] ir-file-1 ...`, without a trailing newline.
pub fn usage(program: &str) -> String {
    Cli::command()
        .override_usage(format!("{program} {USAGE_ARGS}"))
        .render_usage()
        .to_string()
        .trim_end()
        .to_string()
}
