//! In-memory model of a scanned directory tree

use std::collections::BTreeMap;
use std::path::PathBuf;

/// The health signals of a git working copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitStatus {
    /// `git status` reported nothing to commit.
    pub clean_working_tree: bool,
    /// Remote name -> URL, as listed by `git remote -v`.
    pub remotes: BTreeMap<String, String>,
    /// The current commit is known to exist on some remote.
    pub synced_with_remote: bool,
}

impl GitStatus {
    pub fn has_remotes(&self) -> bool {
        !self.remotes.is_empty()
    }

    /// True when any of the three signals is off.
    pub fn is_problem(&self) -> bool {
        !self.clean_working_tree || !self.has_remotes() || !self.synced_with_remote
    }
}

/// One named child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub node: PathNode,
}

/// A directory and its non-hidden children, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryNode {
    pub children: Vec<DirEntry>,
    /// Some child is a git repo or a directory that contains one.
    pub contains_repo: bool,
}

impl DirectoryNode {
    /// Build a directory node, deriving `contains_repo` from the children.
    pub fn new(children: Vec<DirEntry>) -> Self {
        let contains_repo = children.iter().any(|entry| entry.node.counts_as_repo());
        Self {
            children,
            contains_repo,
        }
    }
}

/// A scanned filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathNode {
    /// A symbolic link, never followed. `target` is fully resolved.
    Symlink { target: PathBuf },
    GitRepo(GitStatus),
    MercurialRepo,
    Directory(DirectoryNode),
    PlainFile,
}

impl PathNode {
    /// Whether this node makes its parent directory "contain a repo".
    pub fn counts_as_repo(&self) -> bool {
        match self {
            PathNode::GitRepo(_) => true,
            PathNode::Directory(dir) => dir.contains_repo,
            _ => false,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            PathNode::Directory(dir) => Some(dir),
            _ => None,
        }
    }
}
