//! # Repo Manager Library
//!
//! This library provides the core of the `repo-manager` command-line tool:
//! an inventory of a directory tree that reports the health of every git
//! working copy in it, and declarative setup of individual working copies
//! from small JSON descriptors.
//!
//! ## Quick Example
//!
//! ```
//! use repo_manager::node::{DirEntry, DirectoryNode, GitStatus, PathNode};
//! use repo_manager::render::render;
//!
//! let tree = PathNode::Directory(DirectoryNode::new(vec![
//!     DirEntry {
//!         name: "notes".to_string(),
//!         node: PathNode::GitRepo(GitStatus::default()),
//!     },
//!     DirEntry {
//!         name: "todo.txt".to_string(),
//!         node: PathNode::PlainFile,
//!     },
//! ]));
//!
//! let text = render(&tree, false);
//! assert!(text.contains("Working tree dirty"));
//! assert!(text.ends_with(" ╰╴todo.txt: File"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Classification (`classify`)**: decides what a path is (symlink, git
//!   repo, Mercurial repo, directory, plain file) with an ordered set of
//!   structural probes.
//! - **Status (`status`)**: runs `git` through a [`process::ProcessRunner`]
//!   and derives a [`node::GitStatus`] from its output.
//! - **Scanning (`scan`)**: builds a [`node::PathNode`] tree and the repo
//!   counters for the summary line.
//! - **Rendering (`render`)**: lays the tree out with box-drawing guides,
//!   optionally colored.
//! - **Provisioning (`config`, `provision`, `exclude`, `symlinks`)**: loads
//!   repo descriptors and applies one of them to a working copy: clone,
//!   remotes, the managed exclude section and a symlink farm.
//!
//! Colors and verbosity are plain values passed down from the CLI; nothing in
//! the library reads global flags.

pub mod classify;
pub mod config;
pub mod defaults;
pub mod error;
pub mod exclude;
pub mod node;
pub mod output;
pub mod process;
pub mod provision;
pub mod render;
pub mod scan;
pub mod status;
pub mod symlinks;
