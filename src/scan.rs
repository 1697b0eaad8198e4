//! # Directory Tree Scanning
//!
//! [`Scanner::scan`] classifies a path and, for directories, recurses into
//! every non-hidden entry in the order the filesystem lists them. Git repos
//! are inspected on the spot; symlinks are recorded and never followed, which
//! is the only thing standing between us and a cyclic tree.
//!
//! `contains_repo` is computed bottom-up in the same pass that builds the
//! children, so rendering never needs to walk a subtree twice.

use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::classify::{classify, PathKind};
use crate::error::{Error, Result};
use crate::node::{DirEntry, DirectoryNode, PathNode};
use crate::process::ProcessRunner;
use crate::status;

/// Builds [`PathNode`] trees, running git through the given runner.
pub struct Scanner<'a, R: ProcessRunner + ?Sized> {
    runner: &'a R,
}

impl<'a, R: ProcessRunner + ?Sized> Scanner<'a, R> {
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Scan `path` and everything below it.
    ///
    /// A failing git inspection anywhere in the tree aborts the whole scan.
    pub fn scan(&self, path: &Path) -> Result<PathNode> {
        match classify(path)? {
            PathKind::Symlink { target } => {
                debug!("Scanned link at {}", path.display());
                Ok(PathNode::Symlink { target })
            }
            PathKind::GitRepo => status::inspect(self.runner, path)
                .map(PathNode::GitRepo)
                .map_err(|source| Error::Inspect {
                    path: path.to_path_buf(),
                    source: Box::new(source),
                }),
            PathKind::MercurialRepo => {
                debug!("Scanned Mercurial repo at {}", path.display());
                Ok(PathNode::MercurialRepo)
            }
            PathKind::Directory => self.scan_directory(path).map(PathNode::Directory),
            PathKind::PlainFile => {
                debug!("Scanned file at {}", path.display());
                Ok(PathNode::PlainFile)
            }
        }
    }

    fn scan_directory(&self, path: &Path) -> Result<DirectoryNode> {
        debug!("Scanning directory at {}...", path.display());
        let mut children = Vec::new();
        for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let node = self.scan(entry.path())?;
            children.push(DirEntry { name, node });
        }
        debug!("... Scanning {} done", path.display());
        Ok(DirectoryNode::new(children))
    }
}

/// Repo counters for the summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub git_repos: usize,
    pub mercurial_repos: usize,
    pub clean_repos: usize,
    pub problem_repos: usize,
}

impl ScanSummary {
    /// Count every repo in the tree rooted at `node`.
    pub fn from_node(node: &PathNode) -> Self {
        let mut summary = Self::default();
        summary.record(node);
        summary
    }

    fn record(&mut self, node: &PathNode) {
        match node {
            PathNode::GitRepo(status) => {
                self.git_repos += 1;
                if status.is_problem() {
                    self.problem_repos += 1;
                } else {
                    self.clean_repos += 1;
                }
            }
            PathNode::MercurialRepo => self.mercurial_repos += 1,
            PathNode::Directory(dir) => {
                for entry in &dir.children {
                    self.record(&entry.node);
                }
            }
            PathNode::Symlink { .. } | PathNode::PlainFile => {}
        }
    }
}
