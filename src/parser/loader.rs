//! Reads input files as raw IR modules.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};
use crate::model::InputModule;

/// Read one input file in binary.
pub fn load_module(path: &Path) -> Result<InputModule> {
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("read {} ({} bytes)", path.display(), bytes.len());

    Ok(InputModule {
        name: path.to_string_lossy().into_owned(),
        bytes,
    })
}

/// Lazily read every path in order.
///
/// A file is only opened when the iterator is advanced, so a consumer that
/// stops at the first `Err` never touches the files after it.
pub fn modules(paths: &[PathBuf]) -> impl Iterator<Item = Result<InputModule>> + '_ {
    paths.iter().map(|p| load_module(p))
}
