//! Syscall allow-list filters.
//!
//! A profile names the syscalls a sandboxed process may make; everything
//! else kills the calling thread. [`compile_filter`] turns a profile into a
//! filter through a [`FilterBackend`], and [`install_filter`] loads it inside
//! a privilege bracket.

pub mod allowlist;
pub mod backend;
pub mod compiler;
pub mod installer;

pub use allowlist::{AllowList, AllowListEntry, AllowListItem, AllowListReader};
#[cfg(feature = "libseccomp")]
pub use backend::{LibSeccompBackend, LibSeccompContext};
pub use backend::{BackendError, FilterBackend, FilterContext};
pub use compiler::{AllowedSyscall, CompiledFilter, compile_filter};
pub use installer::{InstallOutcome, install_filter, load_seccomp_profile};
