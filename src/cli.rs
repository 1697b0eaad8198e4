//! CLI argument parsing and command dispatch

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::commands;
use repo_manager::output::OutputConfig;

/// Repo Manager - Manage a directory containing git repos
#[derive(Parser, Debug)]
#[command(name = "repo-manager")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Disable colored output, same as --color=never
    #[arg(long, global = true)]
    no_color: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Verbose output, same as --log-level=debug
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory and show the results
    Scan(commands::scan::ScanArgs),

    /// Clone or set up a repo from configuration
    Setup(commands::setup::SetupArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        self.init_logging()?;

        let color_flag: &str = if self.no_color { "never" } else { &self.color };
        let out = OutputConfig::from_env_and_flag(color_flag);

        match self.command {
            Commands::Scan(args) => commands::scan::execute(args, out),
            Commands::Setup(args) => commands::setup::execute(args, out),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }

    fn init_logging(&self) -> Result<()> {
        let level = if self.verbose {
            LevelFilter::Debug
        } else {
            self.log_level
                .parse::<LevelFilter>()
                .map_err(|_| anyhow!("invalid log level: {}", self.log_level))?
        };

        env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp(None)
            .parse_default_env()
            .try_init()?;
        Ok(())
    }
}
