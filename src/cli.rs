//! Command-line interface definitions using `clap` derive macros.
//!
//! The [`Cli`] struct is the top-level parser, and [`Command`] enumerates all
//! available subcommands. Each variant's fields map directly to CLI arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI arguments shared across all subcommands.
#[derive(Parser)]
#[command(name = "dodot", about = "Dotfiles deployment engine")]
pub struct Cli {
    /// Dotfiles root containing the packs
    #[arg(long, global = true, default_value = "~/dotfiles")]
    pub root: String,

    /// Override the state directory (default: $DODOT_DATA_DIR or the XDG data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase verbosity (-v = DEBUG, -vv = TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease verbosity (-q = WARN, -qq = ERROR, -qqq = OFF)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Preview actions without making changes
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands for the dodot CLI.
#[derive(Subcommand)]
pub enum Command {
    /// Deploy packs: link configs into place, run provisioners once
    On {
        /// Packs to deploy (default: all)
        packs: Vec<String>,

        /// Re-run provisioning handlers even when already provisioned
        #[arg(long)]
        force: bool,

        /// Do not create symlinks under the home directory
        #[arg(long)]
        no_home_links: bool,
    },

    /// Remove everything the selected packs deployed
    Off {
        /// Packs to remove (default: all)
        packs: Vec<String>,
    },

    /// Show deployment state without changing anything
    Status {
        /// Packs to inspect (default: all)
        packs: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate for
        shell: clap_complete::Shell,
    },
}
