//! # Error Handling
//!
//! This module defines the centralized error type for the `repo-manager`
//! library. It uses `thiserror` to build an `Error` enum covering every
//! failure the scanner and the provisioner can run into.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Each variant carries enough context (paths,
//!   argument vectors, captured output) to produce a useful one-shot message
//!   at the top level.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Failures fall into a few families:
//!
//! - Classification exhaustion (`Unclassifiable`).
//! - External command failures (`CommandSpawn`, `CommandFailed`, `Inspect`).
//! - Configuration problems (`ConfigInvalid`, `DuplicateRepo`, `UnknownRepo`).
//! - Preconditions that make provisioning unsafe (`Precondition`).
//! - Wrapped library errors (I/O, JSON, regex, directory walking).

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for repo-manager operations
#[derive(Error, Debug)]
pub enum Error {
    /// No path kind matched. This means the filesystem changed under us or
    /// the path is something exotic (a socket, a device node).
    #[error("Failed to scan {}", path.display())]
    Unclassifiable { path: PathBuf },

    /// An external program could not be started at all.
    #[error("Failed to run `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A mandatory external command exited with a nonzero code.
    #[error("`{command}` exited with code {code}:\n{stdout}\n---\n{stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    /// Inspecting a git working copy failed. Fatal for the whole scan.
    ///
    /// The command output lives in `source`, which the top-level report
    /// prints once under "Caused by".
    #[error("Failed to inspect git repo at {}", path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// A provisioning precondition does not hold.
    #[error("{message}")]
    Precondition { message: String },

    /// A repo descriptor failed validation.
    #[error("{message}")]
    ConfigInvalid { message: String },

    /// Two loaded descriptors share a name.
    #[error("loaded multiple {name} repos")]
    DuplicateRepo { name: String },

    /// The requested descriptor name was never loaded.
    #[error("{name} repository is not known")]
    UnknownRepo { name: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A directory listing error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

impl Error {
    /// Shorthand for [`Error::Precondition`].
    pub fn precondition(message: impl Into<String>) -> Self {
        Error::Precondition {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::ConfigInvalid`].
    pub fn config(message: impl Into<String>) -> Self {
        Error::ConfigInvalid {
            message: message.into(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
