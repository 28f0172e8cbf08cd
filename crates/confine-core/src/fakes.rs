//! In-memory stand-ins for the kernel filter API and the process identity.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use nix::errno::Errno;
use nix::unistd::Uid;

use crate::privilege::Identity;
use crate::seccomp::backend::{BackendError, FilterBackend, FilterContext};

/// Identity whose uid changes are simulated.
#[derive(Debug)]
pub struct FakeIdentity {
    real: Uid,
    effective: Cell<Uid>,
    may_become_root: bool,
    ignore: Cell<bool>,
    ignore_drops: Cell<bool>,
    calls: Cell<usize>,
    log: Option<Rc<RefCell<Vec<Call>>>>,
}

impl FakeIdentity {
    /// A setuid-root process started by `real`: effective uid is root.
    pub const fn setuid_root(real: u32) -> Self {
        Self {
            real: Uid::from_raw(real),
            effective: Cell::new(Uid::from_raw(0)),
            may_become_root: true,
            ignore: Cell::new(false),
            ignore_drops: Cell::new(false),
            calls: Cell::new(0),
            log: None,
        }
    }

    /// A plain process run by `real` that cannot gain root.
    pub const fn unprivileged(real: u32) -> Self {
        Self {
            real: Uid::from_raw(real),
            effective: Cell::new(Uid::from_raw(real)),
            may_become_root: false,
            ignore: Cell::new(false),
            ignore_drops: Cell::new(false),
            calls: Cell::new(0),
            log: None,
        }
    }

    /// Records successful `seteuid` calls into a shared call log.
    pub fn logging_to(mut self, log: Rc<RefCell<Vec<Call>>>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn set_effective(&self, uid: Uid) {
        self.effective.set(uid);
    }

    /// Later `seteuid` calls report success without changing anything.
    pub fn ignore_changes(&self) {
        self.ignore.set(true);
    }

    /// Later `seteuid` calls to a non-root uid succeed without changing anything.
    pub fn ignore_drops(&self) {
        self.ignore_drops.set(true);
    }

    pub fn set_calls(&self) -> usize {
        self.calls.get()
    }
}

impl Identity for FakeIdentity {
    fn real_uid(&self) -> Uid {
        self.real
    }

    fn effective_uid(&self) -> Uid {
        self.effective.get()
    }

    fn set_effective_uid(&self, uid: Uid) -> nix::Result<()> {
        self.calls.set(self.calls.get() + 1);
        if uid != self.real && !self.may_become_root {
            return Err(Errno::EPERM);
        }
        if let Some(log) = &self.log {
            log.borrow_mut().push(Call::SetEuid(uid.as_raw()));
        }
        let ignored = self.ignore.get() || (self.ignore_drops.get() && !uid.is_root());
        if !ignored {
            self.effective.set(uid);
        }
        Ok(())
    }
}

/// Calls observed by a [`FakeBackend`], its contexts and a logging [`FakeIdentity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create,
    SetNoNewPrivs(bool),
    AddExact(i32),
    Add(i32),
    Load,
    Release,
    SetEuid(u32),
}

/// Kernel filter API double with a small syscall table and injectable failures.
#[derive(Debug, Default)]
pub struct FakeBackend {
    pub syscalls: HashMap<String, i32>,
    pub fail_create: bool,
    pub fail_nnp: bool,
    pub fail_exact: HashSet<i32>,
    pub fail_add: HashSet<i32>,
    pub fail_load: bool,
    /// Also print every context call to stderr as it happens.
    pub echo: bool,
    pub calls: Rc<RefCell<Vec<Call>>>,
}

impl FakeBackend {
    pub fn with_syscalls(names: &[(&str, i32)]) -> Self {
        Self {
            syscalls: names.iter().map(|(n, nr)| ((*n).to_owned(), *nr)).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl FilterBackend for FakeBackend {
    type Context = FakeContext;

    fn new_kill_filter(&self) -> Result<Self::Context, BackendError> {
        if self.fail_create {
            return Err(BackendError::new("ENOMEM"));
        }
        self.calls.borrow_mut().push(Call::Create);
        Ok(FakeContext {
            calls: Rc::clone(&self.calls),
            fail_nnp: self.fail_nnp,
            fail_exact: self.fail_exact.clone(),
            fail_add: self.fail_add.clone(),
            fail_load: self.fail_load,
            echo: self.echo,
        })
    }

    fn resolve_syscall(&self, name: &str) -> Option<i32> {
        self.syscalls.get(name).copied()
    }
}

#[derive(Debug)]
pub struct FakeContext {
    calls: Rc<RefCell<Vec<Call>>>,
    fail_nnp: bool,
    fail_exact: HashSet<i32>,
    fail_add: HashSet<i32>,
    fail_load: bool,
    echo: bool,
}

impl FakeContext {
    #[allow(clippy::print_stderr)]
    fn record(&self, call: Call) {
        if self.echo {
            eprintln!("fake filter call: {call:?}");
        }
        self.calls.borrow_mut().push(call);
    }
}

impl FilterContext for FakeContext {
    fn set_no_new_privs(&mut self, enabled: bool) -> Result<(), BackendError> {
        if self.fail_nnp {
            return Err(BackendError::new("EINVAL"));
        }
        self.record(Call::SetNoNewPrivs(enabled));
        Ok(())
    }

    fn add_allow_rule_exact(&mut self, syscall: i32) -> Result<(), BackendError> {
        if self.fail_exact.contains(&syscall) {
            return Err(BackendError::new("EDOM"));
        }
        self.record(Call::AddExact(syscall));
        Ok(())
    }

    fn add_allow_rule(&mut self, syscall: i32) -> Result<(), BackendError> {
        if self.fail_add.contains(&syscall) {
            return Err(BackendError::new("EFAULT"));
        }
        self.record(Call::Add(syscall));
        Ok(())
    }

    fn load(&self) -> Result<(), BackendError> {
        self.record(Call::Load);
        if self.fail_load {
            return Err(BackendError::new("EACCES"));
        }
        Ok(())
    }
}

impl Drop for FakeContext {
    fn drop(&mut self) {
        self.record(Call::Release);
    }
}
