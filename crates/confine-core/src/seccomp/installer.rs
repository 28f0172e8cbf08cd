//! Installs a compiled filter into the kernel inside a privilege bracket.
//!
//! Sequence: raise privileges (unless no-root mode or unrestricted), load
//! the filter, restore privileges, release the filter. Load failures are
//! returned to the caller. Privilege transition failures abort the process.

use confine_common::config::SeccompConfig;
use confine_common::error::{ConfineError, Result};

use super::backend::{FilterBackend, FilterContext};
use super::compiler::{CompiledFilter, compile_filter};
use crate::privilege::{Identity, PrivilegeGuard, die, restore_privileges};

/// What installing a compiled filter did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The filter was loaded with this many allow rules.
    Installed {
        /// Number of allow rules in the loaded filter.
        rules: usize,
    },
    /// The profile was unrestricted; no filter was loaded.
    Unrestricted,
}

/// Installs `filter` for the calling thread.
///
/// Unless `config.disable_nnp` is set, the effective uid is raised to root
/// for the load, because no-new-privileges is off. Afterwards a root
/// effective uid is always dropped back to the real uid, and the filter is
/// released whatever the load outcome.
///
/// # Errors
///
/// Returns [`ConfineError::FilterLoad`] if the kernel rejects the filter.
///
/// # Aborts
///
/// Aborts the process if raising or dropping privileges fails or does not
/// take effect.
pub fn install_filter<C, I>(
    config: &SeccompConfig,
    filter: CompiledFilter<C>,
    identity: &I,
) -> Result<InstallOutcome>
where
    C: FilterContext,
    I: Identity + ?Sized,
{
    let (context, allowed, unrestricted, profile) = filter.into_parts();
    let raise = !config.disable_nnp && !unrestricted;

    let guard = PrivilegeGuard::enter(identity, raise).unwrap_or_else(|err| die(&err));
    let outcome = if unrestricted {
        Ok(InstallOutcome::Unrestricted)
    } else {
        context
            .load()
            .map(|()| InstallOutcome::Installed {
                rules: allowed.len(),
            })
            .map_err(|e| ConfineError::FilterLoad {
                message: e.to_string(),
            })
    };
    if let Err(err) = guard.restore() {
        die(&err);
    }
    drop(context);

    match &outcome {
        Ok(InstallOutcome::Installed { rules }) => {
            tracing::info!(profile = %profile.display(), rules, "seccomp filter installed");
        }
        Ok(InstallOutcome::Unrestricted) => {
            tracing::info!(profile = %profile.display(), "no seccomp filter installed (unrestricted)");
        }
        Err(err) => {
            tracing::warn!(profile = %profile.display(), error = %err, "seccomp filter load failed");
        }
    }
    outcome
}

/// Compiles and installs the allow-list profile `profile_name`.
///
/// If compilation fails, a root effective uid is still dropped back to the
/// real uid before the error is returned.
///
/// # Errors
///
/// See [`compile_filter`] and [`install_filter`].
///
/// # Aborts
///
/// See [`install_filter`].
pub fn load_seccomp_profile<B, I>(
    config: &SeccompConfig,
    profile_name: &str,
    backend: &B,
    identity: &I,
) -> Result<InstallOutcome>
where
    B: FilterBackend,
    I: Identity + ?Sized,
{
    tracing::debug!(profile = profile_name, "loading seccomp profile");
    match compile_filter(config, profile_name, backend) {
        Ok(filter) => install_filter(config, filter, identity),
        Err(err) => {
            if let Err(transition) = restore_privileges(identity) {
                die(&transition);
            }
            Err(err)
        }
    }
}
