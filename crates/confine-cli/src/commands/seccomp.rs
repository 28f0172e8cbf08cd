//! `confine seccomp`: Check and apply syscall allow-lists.

use anyhow::Context;
use clap::{Args, Subcommand};
use confine_common::config::SeccompConfig;
use confine_core::seccomp::allowlist;

use crate::output;

/// Arguments for the `seccomp` command.
#[derive(Args, Debug)]
pub struct SeccompArgs {
    /// Allow-list operation.
    #[command(subcommand)]
    pub command: SeccompCommand,
}

/// Allow-list operations.
#[derive(Subcommand, Debug)]
pub enum SeccompCommand {
    /// Parse an allow-list profile and print the syscalls it allows.
    Check {
        /// Profile name inside the profile directory.
        profile: String,
        /// Print JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Install the profile's filter, then execute a command under it.
    Exec {
        /// Profile name inside the profile directory.
        profile: String,
        /// Command to execute.
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },
}

/// Executes the `seccomp` command.
///
/// # Errors
///
/// Returns an error if the profile cannot be read or the filter cannot be
/// installed, or if the command cannot be executed.
pub fn execute(args: SeccompArgs, config: &SeccompConfig) -> anyhow::Result<()> {
    match args.command {
        SeccompCommand::Check { profile, json } => check(config, &profile, json),
        SeccompCommand::Exec { profile, command } => exec(config, &profile, &command),
    }
}

fn check(config: &SeccompConfig, profile: &str, json: bool) -> anyhow::Result<()> {
    let path = allowlist::profile_path(&config.profile_dir, profile)?;
    let list = allowlist::load(&path)
        .with_context(|| format!("cannot read seccomp profile {}", path.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        print!("{}", output::allowlist_summary(&list));
    }
    Ok(())
}

#[cfg(feature = "libseccomp")]
fn exec(config: &SeccompConfig, profile: &str, command: &[String]) -> anyhow::Result<()> {
    use std::ffi::CString;

    use confine_core::privilege::ProcessIdentity;
    use confine_core::seccomp::{LibSeccompBackend, load_seccomp_profile};

    let argv = command
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<Result<Vec<_>, _>>()
        .context("command arguments must not contain NUL bytes")?;
    let program = argv.first().context("no command given")?;

    let outcome = load_seccomp_profile(config, profile, &LibSeccompBackend, &ProcessIdentity)
        .with_context(|| format!("cannot apply seccomp profile {profile}"))?;
    tracing::debug!(?outcome, program = %command[0], "executing under seccomp profile");

    let errno = match nix::unistd::execvp(program, &argv) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };
    anyhow::bail!("cannot execute {}: {errno}", command[0])
}

#[cfg(not(feature = "libseccomp"))]
fn exec(_config: &SeccompConfig, profile: &str, _command: &[String]) -> anyhow::Result<()> {
    Err(confine_common::error::ConfineError::Unsupported {
        message: format!("cannot apply seccomp profile {profile}: built without libseccomp support"),
    }
    .into())
}
