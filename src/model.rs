use std::path::PathBuf;

/// Command line after classification, before any file is touched.
///
/// Both vectors keep the order the tokens had on the command line:
/// options are handed to the compiler in that order and inputs are
/// linked in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub options: Vec<String>,
    pub inputs: Vec<PathBuf>,
}

/// One IR module: the raw bytes of a single input file.
///
/// The bytes are never inspected here; text IR and bitcode are both
/// passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputModule {
    /// Path as given on the command line; the compiler uses it in diagnostics.
    pub name: String,
    pub bytes: Vec<u8>,
}
