//! CLI command definitions and dispatch.

pub mod mounts;
pub mod seccomp;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use confine_common::config::SeccompConfig;
use confine_common::constants::{BIN_NAME, ENV_SECCOMP_PROFILE_DIR};

/// confine: sandbox mount profiles and syscall allow-lists.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding seccomp allow-list profiles.
    #[arg(long, global = true, env = ENV_SECCOMP_PROFILE_DIR)]
    pub profile_dir: Option<PathBuf>,

    /// Skip the no-new-privileges change and the root bracket around
    /// filter loading (also enabled by `CONFINE_NO_ROOT` being set).
    #[arg(long, global = true)]
    pub no_root: bool,
}

impl Cli {
    /// Resolves the seccomp configuration: environment first, flags on top.
    #[must_use]
    pub fn seccomp_config(&self) -> SeccompConfig {
        let mut config = SeccompConfig::from_env();
        if let Some(dir) = &self.profile_dir {
            config.profile_dir.clone_from(dir);
        }
        if self.no_root {
            config.disable_nnp = true;
        }
        config
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect or normalize mount profiles.
    Mounts(mounts::MountsArgs),
    /// Check or apply seccomp allow-lists.
    Seccomp(seccomp::SeccompArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.seccomp_config();
    match cli.command {
        Command::Mounts(args) => mounts::execute(args),
        Command::Seccomp(args) => seccomp::execute(args, &config),
    }
}
