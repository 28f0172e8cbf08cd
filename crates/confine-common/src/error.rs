//! Unified error types for the confine workspace.
//!
//! Parsing and compiling code returns these to the caller, which decides how
//! to present them. Privilege transition failures are absent:
//! they terminate the process instead of propagating.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ConfineError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A mount profile line could not be parsed.
    #[error("malformed mount entry at {path}:{line}: {reason}")]
    MalformedMountEntry {
        /// Mount profile being loaded.
        path: PathBuf,
        /// 1-based line number of the offending line.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// An allow-list line exceeded the per-line length ceiling.
    #[error("seccomp filter line {line} in {path} was too long ({max} characters max)")]
    LineTooLong {
        /// Allow-list file being read.
        path: PathBuf,
        /// 1-based line number of the offending line.
        line: usize,
        /// Maximum permitted characters, excluding the newline.
        max: usize,
    },

    /// A profile name cannot be turned into a path inside the profile directory.
    #[error("invalid seccomp profile name: {name:?}")]
    InvalidProfileName {
        /// The rejected name.
        name: String,
    },

    /// The kernel filter context could not be created.
    #[error("cannot create seccomp filter: {message}")]
    FilterInit {
        /// Backend error description.
        message: String,
    },

    /// A filter attribute could not be set.
    #[error("cannot set seccomp filter attribute: {message}")]
    FilterAttribute {
        /// Backend error description.
        message: String,
    },

    /// An allow rule could not be added with either rule variant.
    #[error("seccomp rule add failed for '{syscall}': {message}")]
    FilterRule {
        /// Syscall the rule was for.
        syscall: String,
        /// Backend error description.
        message: String,
    },

    /// The kernel rejected the compiled filter.
    #[error("seccomp load failed: {message}")]
    FilterLoad {
        /// Backend error description.
        message: String,
    },

    /// The requested operation needs a feature this build does not include.
    #[error("unsupported: {message}")]
    Unsupported {
        /// Description of the missing capability.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ConfineError>;
