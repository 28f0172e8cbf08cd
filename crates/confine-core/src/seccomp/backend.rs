//! The kernel filter API the compiler and installer drive.
//!
//! A backend creates filter contexts whose default action kills the calling
//! thread and resolves syscall names for the running architecture. A context
//! collects allow rules and is loaded into the kernel once. Dropping a
//! context releases it.

use thiserror::Error;

/// Error reported by a filter backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(String);

impl BackendError {
    /// Creates a backend error from a description.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Factory side of the kernel filter API.
pub trait FilterBackend {
    /// Filter context produced by this backend.
    type Context: FilterContext;

    /// Creates a context whose default action kills on any syscall not allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the context cannot be allocated.
    fn new_kill_filter(&self) -> Result<Self::Context, BackendError>;

    /// Resolves a syscall name for the running architecture.
    ///
    /// Returns `None` if the syscall does not exist here.
    fn resolve_syscall(&self, name: &str) -> Option<i32>;
}

/// A filter under construction.
pub trait FilterContext {
    /// Sets the "no new privileges" attribute applied at load time.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute cannot be set.
    fn set_no_new_privs(&mut self, enabled: bool) -> Result<(), BackendError>;

    /// Adds an unconditional allow rule exactly as given, without
    /// multiplexed-syscall rewriting.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot be added in exact form.
    fn add_allow_rule_exact(&mut self, syscall: i32) -> Result<(), BackendError>;

    /// Adds an unconditional allow rule, letting the backend rewrite it for
    /// multiplexed syscalls.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot be added.
    fn add_allow_rule(&mut self, syscall: i32) -> Result<(), BackendError>;

    /// Loads the filter into the kernel for the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the kernel rejects the filter.
    fn load(&self) -> Result<(), BackendError>;
}

#[cfg(feature = "libseccomp")]
pub use self::libseccomp_backend::{LibSeccompBackend, LibSeccompContext};

#[cfg(feature = "libseccomp")]
mod libseccomp_backend {
    use libseccomp::{ScmpAction, ScmpFilterContext, ScmpSyscall};

    use super::{BackendError, FilterBackend, FilterContext};

    fn backend_error(err: &libseccomp::error::SeccompError) -> BackendError {
        BackendError::new(err.to_string())
    }

    /// Kernel filter API provided by the system `libseccomp`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LibSeccompBackend;

    impl FilterBackend for LibSeccompBackend {
        type Context = LibSeccompContext;

        fn new_kill_filter(&self) -> Result<Self::Context, BackendError> {
            ScmpFilterContext::new_filter(ScmpAction::KillThread)
                .map(|inner| LibSeccompContext { inner })
                .map_err(|e| backend_error(&e))
        }

        fn resolve_syscall(&self, name: &str) -> Option<i32> {
            ScmpSyscall::from_name(name).ok().map(i32::from)
        }
    }

    /// A `libseccomp` filter context; released on drop.
    pub struct LibSeccompContext {
        inner: ScmpFilterContext,
    }

    impl std::fmt::Debug for LibSeccompContext {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("LibSeccompContext").finish_non_exhaustive()
        }
    }

    impl FilterContext for LibSeccompContext {
        fn set_no_new_privs(&mut self, enabled: bool) -> Result<(), BackendError> {
            self.inner
                .set_ctl_nnp(enabled)
                .map_err(|e| backend_error(&e))
        }

        fn add_allow_rule_exact(&mut self, syscall: i32) -> Result<(), BackendError> {
            self.inner
                .add_rule_exact(ScmpAction::Allow, ScmpSyscall::from(syscall))
                .map_err(|e| backend_error(&e))
        }

        fn add_allow_rule(&mut self, syscall: i32) -> Result<(), BackendError> {
            self.inner
                .add_rule(ScmpAction::Allow, ScmpSyscall::from(syscall))
                .map_err(|e| backend_error(&e))
        }

        fn load(&self) -> Result<(), BackendError> {
            self.inner.load().map_err(|e| backend_error(&e))
        }
    }
}
