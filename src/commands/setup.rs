//! # Setup Command Implementation
//!
//! This module implements the `setup` subcommand, which clones or updates a
//! working copy from a named repo descriptor.
//!
//! ## Functionality
//!
//! - **Descriptor Lookup**: Loads every descriptor under the `--config`
//!   directories and picks the one named by `--repo` (or by the target's
//!   directory name).
//! - **Provisioning**: Clones when needed, reconciles remotes, rewrites the
//!   managed exclude section and maintains the symlink farm.
//!
//! Running it again with the same descriptor changes nothing.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;

use repo_manager::config::ConfigDb;
use repo_manager::defaults::{default_config_dir, expand_tilde};
use repo_manager::output::{paint, OutputConfig, Tone};
use repo_manager::process::SystemRunner;
use repo_manager::provision::Provisioner;

/// Clone or set up a repo from configuration
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Directory holding a repo.json, a repo_list.json or further config
    /// directories. May be given more than once.
    ///
    /// Defaults to the `repo-manager` directory in the platform config
    /// directory (e.g., `~/.config/repo-manager` on Linux).
    #[arg(short, long, value_name = "DIR", action = clap::ArgAction::Append)]
    pub config: Vec<PathBuf>,

    /// Name of the repository. Defaults to the target's directory name.
    #[arg(short, long, value_name = "NAME")]
    pub repo: Option<String>,

    /// Directory of the repo to set up
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,
}

/// Execute the `setup` command.
pub fn execute(args: SetupArgs, out: OutputConfig) -> Result<()> {
    let target = std::path::absolute(&args.target)?;
    let parent = target
        .parent()
        .context("the target directory must have a parent")?;
    if !parent.is_dir() {
        bail!("{} is not a directory", parent.display());
    }

    let name = match args.repo {
        Some(name) => name,
        None => target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("cannot derive a repo name from the target, pass --repo")?,
    };

    let config_dirs = if args.config.is_empty() {
        vec![default_config_dir()]
    } else {
        args.config
    };
    let mut db = ConfigDb::new();
    for dir in &config_dirs {
        db.load_path(&std::path::absolute(expand_tilde(dir))?)?;
    }

    let config = match db.lookup(&name) {
        Ok(config) => config,
        Err(e) => bail!(paint(&e.to_string(), Tone::Bad, out.use_color)),
    };

    let runner = SystemRunner;
    let report = Provisioner::new(&runner).provision(&target, config)?;
    for change in &report.changes {
        log::info!("{}: {}", target.display(), change);
    }

    println!(
        "{}",
        paint(
            &format!("{} set up successfully", target.display()),
            Tone::Good,
            out.use_color
        )
    );
    Ok(())
}
