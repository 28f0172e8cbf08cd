//! `confine mounts`: Inspect and normalize mount profiles.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use confine_core::mount::{load_mount_profile, save_mount_profile, sort_mount_entries};

use crate::output;

/// Arguments for the `mounts` command.
#[derive(Args, Debug)]
pub struct MountsArgs {
    /// Mount profile operation.
    #[command(subcommand)]
    pub command: MountsCommand,
}

/// Mount profile operations.
#[derive(Subcommand, Debug)]
pub enum MountsCommand {
    /// Print the entries of a mount profile.
    Show {
        /// Path to the mount profile.
        path: PathBuf,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Sort a mount profile into canonical order and save it.
    Sort {
        /// Path to the mount profile.
        path: PathBuf,
        /// Write the sorted profile here instead of in place.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Executes the `mounts` command.
///
/// # Errors
///
/// Returns an error if the profile cannot be loaded or saved.
pub fn execute(args: MountsArgs) -> anyhow::Result<()> {
    match args.command {
        MountsCommand::Show { path, json } => {
            let list = load_mount_profile(&path)
                .with_context(|| format!("cannot load mount profile {}", path.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else if list.is_empty() {
                println!("No mount entries.");
            } else {
                print!("{}", output::mount_table(&list));
            }
        }
        MountsCommand::Sort { path, output } => {
            let mut list = load_mount_profile(&path)
                .with_context(|| format!("cannot load mount profile {}", path.display()))?;
            sort_mount_entries(&mut list);
            let target = output.unwrap_or(path);
            save_mount_profile(&list, &target)
                .with_context(|| format!("cannot save mount profile {}", target.display()))?;
            tracing::info!(path = %target.display(), entries = list.len(), "sorted mount profile");
        }
    }
    Ok(())
}
