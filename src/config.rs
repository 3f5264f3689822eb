//! Wrapper settings. All of them come from the environment because every
//! command-line token is reserved for libNVVM.

use std::env;
use std::path::PathBuf;

pub const LIBNVVM_VAR: &str = "PTXGEN_LIBNVVM";
pub const LOG_VAR: &str = "PTXGEN_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Explicit libNVVM shared library, tried before anything else.
    pub libnvvm: Option<PathBuf>,
    /// CUDA installation root (`CUDA_HOME`, then `CUDA_PATH`).
    pub cuda_home: Option<PathBuf>,
    /// `env_logger` filter string.
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            libnvvm: get(LIBNVVM_VAR).map(PathBuf::from),
            cuda_home: get("CUDA_HOME").or_else(|| get("CUDA_PATH")).map(PathBuf::from),
            log_filter: get(LOG_VAR)
                .or_else(|| get("RUST_LOG"))
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            libnvvm: None,
            cuda_home: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
