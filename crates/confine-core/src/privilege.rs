//! Scoped effective-uid escalation around kernel filter installation.
//!
//! The effective uid is process-wide state. A [`PrivilegeGuard`] holds a
//! process-global lock for its whole lifetime, optionally raises the
//! effective uid to root on entry, and always drops back to the real uid on
//! exit. Both transitions are verified by reading the effective uid back.
//!
//! A transition that fails or does not take effect leaves the process in an
//! ambiguous privilege state. Callers must not try to recover from a
//! [`PrivilegeTransitionError`]; they hand it to [`die`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use nix::errno::Errno;
use nix::unistd::Uid;
use thiserror::Error;

static PRIVILEGE_LOCK: Mutex<()> = Mutex::new(());

/// Access to the process's user identity.
pub trait Identity {
    /// Real user id.
    fn real_uid(&self) -> Uid;
    /// Effective user id.
    fn effective_uid(&self) -> Uid;
    /// Sets the effective user id.
    ///
    /// # Errors
    ///
    /// Returns the errno reported by `seteuid(2)`.
    fn set_effective_uid(&self, uid: Uid) -> nix::Result<()>;
}

/// The identity of the running process, backed by `getuid`/`geteuid`/`seteuid`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessIdentity;

impl Identity for ProcessIdentity {
    fn real_uid(&self) -> Uid {
        nix::unistd::getuid()
    }

    fn effective_uid(&self) -> Uid {
        nix::unistd::geteuid()
    }

    fn set_effective_uid(&self, uid: Uid) -> nix::Result<()> {
        nix::unistd::seteuid(uid)
    }
}

/// A privilege transition that failed or did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrivilegeTransitionError {
    /// `seteuid(2)` itself reported an error.
    #[error("seteuid({uid}) failed: {errno}")]
    SetEffectiveUid {
        /// Requested effective uid.
        uid: Uid,
        /// Error reported by the kernel.
        errno: Errno,
    },

    /// Escalation returned success but the effective uid is not root.
    #[error("raising privileges did not work: effective uid is {actual}")]
    RaiseIneffective {
        /// Effective uid observed after the call.
        actual: Uid,
    },

    /// The drop returned success but the effective uid is still root.
    #[error("dropping privileges did not work: effective uid is still {actual}")]
    DropIneffective {
        /// Effective uid observed after the call.
        actual: Uid,
    },
}

/// Sets the effective uid to root and checks that it took effect.
///
/// # Errors
///
/// Returns a [`PrivilegeTransitionError`] if `seteuid` fails or the
/// effective uid is not root afterwards.
pub fn raise_privileges<I: Identity + ?Sized>(
    identity: &I,
) -> Result<(), PrivilegeTransitionError> {
    let root = Uid::from_raw(0);
    identity
        .set_effective_uid(root)
        .map_err(|errno| PrivilegeTransitionError::SetEffectiveUid { uid: root, errno })?;
    let actual = identity.effective_uid();
    if !actual.is_root() {
        return Err(PrivilegeTransitionError::RaiseIneffective { actual });
    }
    tracing::debug!("raised effective uid to root");
    Ok(())
}

/// Drops a root effective uid back to the real uid and checks the result.
///
/// Does nothing if the effective uid is not root. When the real uid is root
/// as well, staying root is expected and not an error.
///
/// # Errors
///
/// Returns a [`PrivilegeTransitionError`] if `seteuid` fails or a non-root
/// real uid did not become effective.
pub fn restore_privileges<I: Identity + ?Sized>(
    identity: &I,
) -> Result<(), PrivilegeTransitionError> {
    if !identity.effective_uid().is_root() {
        return Ok(());
    }
    let real = identity.real_uid();
    identity
        .set_effective_uid(real)
        .map_err(|errno| PrivilegeTransitionError::SetEffectiveUid { uid: real, errno })?;
    let actual = identity.effective_uid();
    if !real.is_root() && actual.is_root() {
        return Err(PrivilegeTransitionError::DropIneffective { actual });
    }
    tracing::debug!(uid = %real, "restored effective uid");
    Ok(())
}

/// Logs `err` and aborts the process.
pub fn die(err: &PrivilegeTransitionError) -> ! {
    tracing::error!(error = %err, "privilege transition failed, aborting");
    std::process::abort()
}

/// Process-wide privilege bracket.
///
/// Dropping the guard restores privileges; a failed restore aborts the
/// process. Use [`PrivilegeGuard::restore`] to observe the restore result.
#[must_use = "privileges are restored when the guard is dropped"]
pub struct PrivilegeGuard<'a, I: Identity + ?Sized> {
    identity: &'a I,
    restored: bool,
    _lock: MutexGuard<'static, ()>,
}

impl<'a, I: Identity + ?Sized> PrivilegeGuard<'a, I> {
    /// Enters the bracket, raising the effective uid to root if `raise` is set.
    ///
    /// Blocks while another guard is alive anywhere in the process.
    ///
    /// # Errors
    ///
    /// Returns the escalation failure. Privileges are restored before the
    /// error is returned.
    pub fn enter(identity: &'a I, raise: bool) -> Result<Self, PrivilegeTransitionError> {
        let lock = PRIVILEGE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let guard = Self {
            identity,
            restored: false,
            _lock: lock,
        };
        if raise {
            raise_privileges(identity)?;
        }
        Ok(guard)
    }

    /// Leaves the bracket, returning the outcome of the privilege drop.
    ///
    /// # Errors
    ///
    /// See [`restore_privileges`].
    pub fn restore(mut self) -> Result<(), PrivilegeTransitionError> {
        self.restored = true;
        restore_privileges(self.identity)
    }
}

impl<I: Identity + ?Sized> Drop for PrivilegeGuard<'_, I> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        if let Err(err) = restore_privileges(self.identity) {
            die(&err);
        }
    }
}

impl<I: Identity + ?Sized> std::fmt::Debug for PrivilegeGuard<'_, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivilegeGuard")
            .field("restored", &self.restored)
            .finish_non_exhaustive()
    }
}
