//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `repo-manager` command-line tool. Each subcommand is defined in its own
//! file to keep the logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic.
//!
//! The `execute` function calls into the `repo_manager` library for the actual
//! work; commands only resolve paths, print and turn errors into `anyhow`.

pub mod completions;
pub mod scan;
pub mod setup;
