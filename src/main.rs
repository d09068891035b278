//! dodot — a dotfiles deployment engine.
//!
//! Packs (per-application bundles under the dotfiles root) are matched
//! against an ordered rule set and materialised onto the system: symlinks
//! into place through a content-addressed state tree, PATH and shell
//! fragments for the login snippet to discover, and one-shot provisioning
//! scripts gated by checksum sentinels. `on` deploys, `off` reverses,
//! `status` inspects without executing anything.

mod checksum;
mod cli;
mod config;
mod datastore;
mod error;
mod handlers;
mod lock;
mod ops;
mod packs;
mod paths;
mod platform;
mod report;
mod rules;
#[allow(clippy::items_after_test_module)]
#[cfg(test)]
mod test_helpers;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use ops::{off::OffOptions, on::OnOptions, status::StatusOptions};
use paths::Paths;
use platform::{Fs, RealFs, RealLocker, RealRunner};
use report::CommandResult;

const LOCK_TIMEOUT: Duration = Duration::from_secs(10);

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(2);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    // verbosity is a signed level: positive = more verbose, negative = quieter
    let level = cli.verbose as i8 - cli.quiet as i8;
    let filter = match level {
        ..=-3 => "dodot=off",
        -2 => "dodot=error",
        -1 => "dodot=warn",
        0 => "dodot=info",
        1 => "dodot=debug",
        2.. => "dodot=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .without_time()
        .init();

    let fs = RealFs;
    let runner = RealRunner;

    match cli.command {
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "dodot", &mut std::io::stdout());
            Ok(0)
        }
        command => {
            let root = expand_root(&cli.root, &fs);
            let paths = Paths::from_env(root, cli.data_dir.clone(), &fs)?;

            let result = match command {
                Command::On {
                    packs,
                    force,
                    no_home_links,
                } => {
                    let _lock = acquire(&paths)?;
                    ops::on::run(
                        &paths,
                        &OnOptions {
                            pack_names: packs,
                            dry_run: cli.dry_run,
                            force,
                            enable_home_symlinks: !no_home_links,
                        },
                        &fs,
                        &runner,
                    )?
                }
                Command::Off { packs } => {
                    let _lock = acquire(&paths)?;
                    ops::off::run(
                        &paths,
                        &OffOptions {
                            pack_names: packs,
                            dry_run: cli.dry_run,
                        },
                        &fs,
                    )?
                }
                Command::Status { packs } => ops::status::run(
                    &paths,
                    &StatusOptions { pack_names: packs },
                    &fs,
                )?,
                Command::Completions { .. } => unreachable!(),
            };

            render(&result);
            Ok(result.exit_code())
        }
    }
}

/// Expand a leading `~` in the user-supplied dotfiles root.
fn expand_root(root: &str, fs: &impl Fs) -> PathBuf {
    if let Some(rest) = root.strip_prefix("~/")
        && let Some(home) = fs.home_dir()
    {
        return home.join(rest);
    }
    if root == "~"
        && let Some(home) = fs.home_dir()
    {
        return home;
    }
    PathBuf::from(root)
}

/// Take the state-tree lock; it is released when the returned guard drops.
fn acquire(paths: &Paths) -> Result<RealLocker> {
    let mut locker = RealLocker::open(paths.lock_path())?;
    lock::wait_for_lock(&mut locker, LOCK_TIMEOUT)?;
    Ok(locker)
}

/// Render a command result for the terminal, one pack per block.
fn render(result: &CommandResult) {
    for pack in &result.packs {
        println!("{} [{}]", pack.name, pack.health().label());
        if pack.files.is_empty() {
            println!("  (no matching files)");
            continue;
        }
        let width = pack
            .files
            .iter()
            .map(|f| f.rel.display().to_string().len())
            .max()
            .unwrap_or(0);
        for file in &pack.files {
            println!(
                "  {:<width$}  {:<8}  {}",
                file.rel.display().to_string(),
                file.handler,
                file.outcome.summary(),
            );
        }
    }
}
