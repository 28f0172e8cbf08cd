//! Compiles an allow-list profile into a default-deny syscall filter.

use std::path::{Path, PathBuf};

use confine_common::config::SeccompConfig;
use confine_common::error::{ConfineError, Result};

use super::allowlist::{self, AllowListItem};
use super::backend::{FilterBackend, FilterContext};

/// A syscall that received an allow rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedSyscall {
    /// Name as written in the profile.
    pub name: String,
    /// Number on the running architecture.
    pub number: i32,
    /// 1-based profile line.
    pub line: usize,
}

/// A filter built from one allow-list profile, ready to be installed once.
#[derive(Debug)]
pub struct CompiledFilter<C> {
    context: C,
    allowed: Vec<AllowedSyscall>,
    unrestricted: bool,
    profile: PathBuf,
}

impl<C> CompiledFilter<C> {
    /// Syscalls that received an allow rule, in profile order.
    #[must_use]
    pub fn allowed(&self) -> &[AllowedSyscall] {
        &self.allowed
    }

    /// True if the profile reached `@unrestricted`. Such a filter is never
    /// loaded into the kernel.
    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        self.unrestricted
    }

    /// Profile file the filter was compiled from.
    #[must_use]
    pub fn profile(&self) -> &Path {
        &self.profile
    }

    pub(crate) fn into_parts(self) -> (C, Vec<AllowedSyscall>, bool, PathBuf) {
        (self.context, self.allowed, self.unrestricted, self.profile)
    }
}

/// Compiles the allow-list profile `profile_name` from `config.profile_dir`.
///
/// Syscalls the backend cannot resolve are skipped. Reading stops at
/// `@unrestricted`, leaving the rules added so far in a filter that the
/// installer will not load.
///
/// # Errors
///
/// - [`ConfineError::FilterInit`] if the filter context cannot be created.
/// - [`ConfineError::FilterAttribute`] if no-new-privileges cannot be cleared.
/// - [`ConfineError::InvalidProfileName`] if `profile_name` is not a plain file name.
/// - [`ConfineError::Io`] if the profile cannot be opened or read.
/// - [`ConfineError::LineTooLong`] for an overlong profile line.
/// - [`ConfineError::FilterRule`] if an allow rule cannot be added.
pub fn compile_filter<B: FilterBackend>(
    config: &SeccompConfig,
    profile_name: &str,
    backend: &B,
) -> Result<CompiledFilter<B::Context>> {
    let mut context = backend
        .new_kill_filter()
        .map_err(|e| ConfineError::FilterInit {
            message: e.to_string(),
        })?;

    // No-new-privileges would block exec transitions of the MAC layer, so it
    // stays off and loading the filter needs root instead.
    if !config.disable_nnp {
        context
            .set_no_new_privs(false)
            .map_err(|e| ConfineError::FilterAttribute {
                message: format!("cannot disable no-new-privileges: {e}"),
            })?;
    }

    let path = allowlist::profile_path(&config.profile_dir, profile_name)?;
    let reader = allowlist::open(&path)?;

    let mut allowed = Vec::new();
    let mut unrestricted = false;
    for item in reader {
        match item? {
            AllowListItem::Unrestricted { line } => {
                tracing::info!(path = %path.display(), line, "seccomp profile is unrestricted");
                unrestricted = true;
            }
            AllowListItem::Syscall(entry) => {
                let Some(number) = backend.resolve_syscall(&entry.name) else {
                    tracing::debug!(
                        syscall = %entry.name,
                        line = entry.line,
                        "syscall not available on this kernel, skipping"
                    );
                    continue;
                };
                add_allow_rule(&mut context, &entry.name, number)?;
                allowed.push(AllowedSyscall {
                    name: entry.name,
                    number,
                    line: entry.line,
                });
            }
        }
    }

    tracing::debug!(
        path = %path.display(),
        rules = allowed.len(),
        unrestricted,
        "compiled seccomp filter"
    );
    Ok(CompiledFilter {
        context,
        allowed,
        unrestricted,
        profile: path,
    })
}

fn add_allow_rule<C: FilterContext>(context: &mut C, name: &str, number: i32) -> Result<()> {
    if let Err(exact) = context.add_allow_rule_exact(number) {
        tracing::debug!(syscall = name, error = %exact, "exact rule rejected, retrying");
        context
            .add_allow_rule(number)
            .map_err(|e| ConfineError::FilterRule {
                syscall: name.to_owned(),
                message: e.to_string(),
            })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{Call, FakeBackend};

    struct Profiles {
        dir: tempfile::TempDir,
    }

    impl Profiles {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().expect("tempdir"),
            }
        }

        fn write(&self, name: &str, content: &str) {
            std::fs::write(self.dir.path().join(name), content).expect("write profile");
        }

        fn config(&self) -> SeccompConfig {
            SeccompConfig {
                profile_dir: self.dir.path().to_path_buf(),
                disable_nnp: false,
            }
        }
    }

    fn backend() -> FakeBackend {
        FakeBackend::with_syscalls(&[("read", 0), ("write", 1), ("exit_group", 231)])
    }

    #[test]
    fn compile_adds_exact_rules_in_order() {
        let profiles = Profiles::new();
        profiles.write("app", "read\nwrite\n");
        let backend = backend();

        let filter = compile_filter(&profiles.config(), "app", &backend).expect("compile");
        assert!(!filter.is_unrestricted());
        let numbers: Vec<_> = filter.allowed().iter().map(|a| a.number).collect();
        assert_eq!(numbers, [0, 1]);
        assert_eq!(filter.profile(), profiles.dir.path().join("app"));
        assert_eq!(
            backend.calls(),
            [
                Call::Create,
                Call::SetNoNewPrivs(false),
                Call::AddExact(0),
                Call::AddExact(1)
            ]
        );
    }

    #[test]
    fn compile_with_nnp_disabled_leaves_attribute_alone() {
        let profiles = Profiles::new();
        profiles.write("app", "read\n");
        let backend = backend();
        let mut config = profiles.config();
        config.disable_nnp = true;

        let _filter = compile_filter(&config, "app", &backend).expect("compile");
        assert!(!backend.calls().contains(&Call::SetNoNewPrivs(false)));
    }

    #[test]
    fn compile_stops_at_unrestricted() {
        let profiles = Profiles::new();
        profiles.write("app", "# comment\n\nread\n@unrestricted\nwrite\n");
        let backend = backend();

        let filter = compile_filter(&profiles.config(), "app", &backend).expect("compile");
        assert!(filter.is_unrestricted());
        let names: Vec<_> = filter.allowed().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["read"]);
        assert!(!backend.calls().contains(&Call::AddExact(1)));
    }

    #[test]
    fn compile_skips_unknown_syscalls() {
        let profiles = Profiles::new();
        profiles.write("app", "read\nnot_a_syscall_on_this_arch\nexit_group\n");
        let backend = backend();

        let filter = compile_filter(&profiles.config(), "app", &backend).expect("compile");
        let numbers: Vec<_> = filter.allowed().iter().map(|a| a.number).collect();
        assert_eq!(numbers, [0, 231]);
        assert_eq!(filter.allowed()[1].line, 3);
    }

    #[test]
    fn compile_falls_back_to_multiplexed_rule() {
        let profiles = Profiles::new();
        profiles.write("app", "read\nwrite\n");
        let mut backend = backend();
        let _ = backend.fail_exact.insert(1);

        let filter = compile_filter(&profiles.config(), "app", &backend).expect("compile");
        assert_eq!(filter.allowed().len(), 2);
        assert!(backend.calls().contains(&Call::Add(1)));
        assert!(!backend.calls().contains(&Call::Add(0)));
    }

    #[test]
    fn compile_fails_when_both_rule_variants_fail() {
        let profiles = Profiles::new();
        profiles.write("app", "read\nwrite\n");
        let mut backend = backend();
        let _ = backend.fail_exact.insert(1);
        let _ = backend.fail_add.insert(1);

        let err = compile_filter(&profiles.config(), "app", &backend).expect_err("rule");
        match err {
            ConfineError::FilterRule { syscall, .. } => assert_eq!(syscall, "write"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(backend.calls().last(), Some(&Call::Release));
    }

    #[test]
    fn compile_reports_context_allocation_failure() {
        let profiles = Profiles::new();
        profiles.write("app", "read\n");
        let mut backend = backend();
        backend.fail_create = true;

        let err = compile_filter(&profiles.config(), "app", &backend).expect_err("init");
        assert!(matches!(err, ConfineError::FilterInit { .. }));
    }

    #[test]
    fn compile_reports_nnp_failure() {
        let profiles = Profiles::new();
        profiles.write("app", "read\n");
        let mut backend = backend();
        backend.fail_nnp = true;

        let err = compile_filter(&profiles.config(), "app", &backend).expect_err("nnp");
        assert!(matches!(err, ConfineError::FilterAttribute { .. }));
        assert_eq!(backend.calls(), [Call::Create, Call::Release]);
    }

    #[test]
    fn compile_missing_profile_is_error() {
        let profiles = Profiles::new();
        let backend = backend();
        let err = compile_filter(&profiles.config(), "absent", &backend).expect_err("missing");
        assert!(matches!(err, ConfineError::Io { .. }));
    }

    #[test]
    fn compile_rejects_path_like_profile_names() {
        let profiles = Profiles::new();
        let backend = backend();
        let err = compile_filter(&profiles.config(), "../app", &backend).expect_err("name");
        assert!(matches!(err, ConfineError::InvalidProfileName { .. }));
    }

    #[test]
    fn compile_reports_overlong_line_number() {
        let profiles = Profiles::new();
        profiles.write("app", &format!("read\n# note\n{}", "w".repeat(81)));
        let backend = backend();

        let err = compile_filter(&profiles.config(), "app", &backend).expect_err("too long");
        assert!(matches!(err, ConfineError::LineTooLong { line: 3, max: 80, .. }));
        assert_eq!(backend.calls().last(), Some(&Call::Release));
    }
}
