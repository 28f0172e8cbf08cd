//! Configuration model for the syscall filter loader.
//!
//! Populated once at the process boundary (environment or CLI flags) and
//! passed explicitly into the compiler and installer.

use std::ffi::OsString;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SECCOMP_PROFILE_DIR, ENV_NO_ROOT, ENV_SECCOMP_PROFILE_DIR};

/// Settings that steer compilation and installation of a syscall filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeccompConfig {
    /// Directory holding allow-list profiles.
    pub profile_dir: PathBuf,
    /// Skip the no-new-privileges attribute change and the privilege
    /// bracket around installation. Intended for non-root test runs.
    pub disable_nnp: bool,
}

impl Default for SeccompConfig {
    fn default() -> Self {
        Self {
            profile_dir: PathBuf::from(DEFAULT_SECCOMP_PROFILE_DIR),
            disable_nnp: false,
        }
    }
}

impl SeccompConfig {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_vars(|key| std::env::var_os(key))
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// An empty profile directory override is ignored. The no-root switch
    /// is keyed on presence only; its value is not inspected.
    pub fn from_env_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_SECCOMP_PROFILE_DIR).filter(|d| !d.is_empty()) {
            config.profile_dir = PathBuf::from(dir);
        }
        config.disable_nnp = lookup(ENV_NO_ROOT).is_some();
        config
    }
}
