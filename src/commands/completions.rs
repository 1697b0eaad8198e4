//! # Completions Command Implementation
//!
//! Prints a shell completion script for `repo-manager` to stdout, generated
//! from the clap definition by `clap_complete`.
//!
//! ```bash
//! repo-manager completions bash > ~/.local/share/bash-completion/completions/repo-manager
//! repo-manager completions zsh > ~/.zfunc/_repo-manager
//! repo-manager completions fish > ~/.config/fish/completions/repo-manager.fish
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
