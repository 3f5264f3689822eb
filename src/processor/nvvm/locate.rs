//! Where to look for the libNVVM shared library.

use std::path::{Path, PathBuf};

use crate::config::Config;

#[cfg(target_os = "windows")]
const LIB_DIR: &str = "nvvm/bin";
#[cfg(target_os = "macos")]
const LIB_DIR: &str = "nvvm/lib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const LIB_DIR: &str = "nvvm/lib64";

#[cfg(target_os = "windows")]
const LIB_NAMES: &[&str] = &["nvvm64_40_0.dll"];
#[cfg(target_os = "macos")]
const LIB_NAMES: &[&str] = &["libnvvm.dylib"];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const LIB_NAMES: &[&str] = &["libnvvm.so", "libnvvm.so.4"];

/// Candidate paths, most specific first: the configured library, then the
/// CUDA installation, then bare names left to the system loader's search
/// path.
pub fn candidates(config: &Config) -> Vec<PathBuf> {
    let mut out = Vec::new();

    if let Some(path) = &config.libnvvm {
        out.push(path.clone());
    }
    if let Some(root) = &config.cuda_home {
        out.extend(in_cuda_root(root));
    }
    out.extend(LIB_NAMES.iter().map(PathBuf::from));

    out
}

fn in_cuda_root(root: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    LIB_NAMES.iter().map(move |name| root.join(LIB_DIR).join(name))
}
