use std::fmt;
use std::ffi::c_int;

/// `nvvmResult` status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvvmResult {
    Success,
    OutOfMemory,
    ProgramCreationFailure,
    IrVersionMismatch,
    InvalidInput,
    InvalidProgram,
    InvalidIr,
    InvalidOption,
    NoModuleInProgram,
    Compilation,
    Cancelled,
    Unknown(c_int),
}

impl NvvmResult {
    pub fn from_raw(code: c_int) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::OutOfMemory,
            2 => Self::ProgramCreationFailure,
            3 => Self::IrVersionMismatch,
            4 => Self::InvalidInput,
            5 => Self::InvalidProgram,
            6 => Self::InvalidIr,
            7 => Self::InvalidOption,
            8 => Self::NoModuleInProgram,
            9 => Self::Compilation,
            10 => Self::Cancelled,
            other => Self::Unknown(other),
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Name used by `nvvm.h`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Success => "NVVM_SUCCESS",
            Self::OutOfMemory => "NVVM_ERROR_OUT_OF_MEMORY",
            Self::ProgramCreationFailure => "NVVM_ERROR_PROGRAM_CREATION_FAILURE",
            Self::IrVersionMismatch => "NVVM_ERROR_IR_VERSION_MISMATCH",
            Self::InvalidInput => "NVVM_ERROR_INVALID_INPUT",
            Self::InvalidProgram => "NVVM_ERROR_INVALID_PROGRAM",
            Self::InvalidIr => "NVVM_ERROR_INVALID_IR",
            Self::InvalidOption => "NVVM_ERROR_INVALID_OPTION",
            Self::NoModuleInProgram => "NVVM_ERROR_NO_MODULE_IN_PROGRAM",
            Self::Compilation => "NVVM_ERROR_COMPILATION",
            Self::Cancelled => "NVVM_ERROR_CANCELLED",
            Self::Unknown(_) => "NVVM_ERROR_UNKNOWN",
        }
    }
}

impl fmt::Display for NvvmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "{} ({code})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}
