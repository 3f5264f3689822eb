use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::processor::nvvm::NvvmResult;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Nothing to compile was given on the command line.
    #[error("{}", crate::cli::usage(.program))]
    Usage { program: String },

    #[error("cannot read `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// libNVVM could not be opened from any candidate location.
    #[error(
        "could not load libNVVM (tried: {}); set PTXGEN_LIBNVVM or CUDA_HOME",
        .attempts.join(", ")
    )]
    LibraryLoad { attempts: Vec<String> },

    #[error("libNVVM is missing symbol `{name}`")]
    Symbol {
        name: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("{call} failed: {result}{}", render_log(.log))]
    Nvvm {
        call: &'static str,
        result: NvvmResult,
        log: Option<String>,
    },

    #[error("{what} contains an interior NUL byte: {value:?}")]
    Nul { what: &'static str, value: String },

    #[error("compiled output is not valid UTF-8")]
    InvalidOutput(#[source] FromUtf8Error),
}

fn render_log(log: &Option<String>) -> String {
    match log {
        Some(log) => format!("\n{log}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nvvm_error_appends_program_log() {
        let err = Error::Nvvm {
            call: "nvvmVerifyProgram",
            result: NvvmResult::InvalidIr,
            log: Some("input.ll:3: error: undefined value '%x'".into()),
        };
        assert_eq!(
            err.to_string(),
            "nvvmVerifyProgram failed: NVVM_ERROR_INVALID_IR\ninput.ll:3: error: undefined value '%x'"
        );
    }

    #[test]
    fn nvvm_error_without_log_is_one_line() {
        let err = Error::Nvvm {
            call: "nvvmCreateProgram",
            result: NvvmResult::OutOfMemory,
            log: None,
        };
        assert_eq!(
            err.to_string(),
            "nvvmCreateProgram failed: NVVM_ERROR_OUT_OF_MEMORY"
        );
    }

    #[test]
    fn load_error_lists_every_attempt() {
        let err = Error::LibraryLoad {
            attempts: vec!["/opt/cuda/nvvm/lib64/libnvvm.so".into(), "libnvvm.so".into()],
        };
        assert!(
            err.to_string()
                .contains("/opt/cuda/nvvm/lib64/libnvvm.so, libnvvm.so")
        );
    }
}
