//! # Scan Command Implementation
//!
//! This module implements the `scan` subcommand, which inventories a directory
//! tree and reports the health of every git working copy below it.
//!
//! ## Output
//!
//! - The scanned directory followed by its rendered tree. Directories that
//!   contain no repos collapse to a single label.
//! - A blank line.
//! - The summary: `N clean repos, M dirty repos` (or `No dirty repos`).
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;

use repo_manager::output::OutputConfig;
use repo_manager::process::SystemRunner;
use repo_manager::render::{render_report, render_summary};
use repo_manager::scan::{ScanSummary, Scanner};

/// Scan a directory and show the results
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan. Defaults to the current directory.
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    pub directory: PathBuf,
}

/// Execute the `scan` command.
pub fn execute(args: ScanArgs, out: OutputConfig) -> Result<()> {
    let directory = std::path::absolute(&args.directory)?;
    if !directory.is_dir() {
        bail!("{} is not a directory", directory.display());
    }

    let runner = SystemRunner;
    let tree = Scanner::new(&runner).scan(&directory)?;
    let summary = ScanSummary::from_node(&tree);
    log::debug!(
        "Found {} git repos and {} Mercurial repos",
        summary.git_repos,
        summary.mercurial_repos
    );

    println!(
        "{}",
        render_report(&directory.display().to_string(), &tree, out.use_color)
    );
    println!();
    println!("{}", render_summary(&summary, out.use_color));
    Ok(())
}
